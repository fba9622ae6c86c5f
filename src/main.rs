use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use git_release::cli::{
    plan_release, resolve_branch, run_release_workflow, ReleasePlan, ReleaseWorkflowArgs,
    WorkflowOutcome,
};
use git_release::config::{self, Config};
use git_release::domain::{NextRelease, ReleaseLevel};
use git_release::git::Git2Repository;
use git_release::notify::{dispatcher_for, NotificationKind, Notifier, TemplateContext};
use git_release::ui;

#[derive(Parser)]
#[command(
    name = "git-release",
    version,
    about = "Compute releases from conventional commits with an ordered rule table"
)]
struct Cli {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Target {
    #[arg(
        short,
        long,
        help = "Branch to release (defaults to the current branch)"
    )]
    branch: Option<String>,

    #[arg(long, default_value = ".", help = "Path inside the git repository")]
    repo: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Classify the commits since the last release
    Analyze {
        #[command(flatten)]
        target: Target,
    },
    /// Render the release notes of the next release
    Changelog {
        #[command(flatten)]
        target: Target,

        #[arg(
            short,
            long,
            help = "Prepend the notes to this file instead of printing"
        )]
        output: Option<PathBuf>,
    },
    /// Tag the next release, write notes and send notifications
    Release {
        #[command(flatten)]
        target: Target,

        #[arg(long, help = "Preview what would happen without making changes")]
        dry_run: bool,

        #[arg(long, help = "Prepend the release notes to this changelog file")]
        changelog: Option<PathBuf>,

        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    /// Render a notification template
    Notify {
        #[arg(long, conflicts_with = "failure", required_unless_present = "failure")]
        success: bool,

        #[arg(long)]
        failure: bool,

        #[arg(long, help = "Version of the release being reported")]
        version: Option<String>,

        #[arg(
            long = "type",
            default_value = "patch",
            help = "Release type of the release"
        )]
        release_type: ReleaseLevel,

        #[arg(short, long)]
        branch: Option<String>,
    },
    /// List configured release branches
    Branches,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_new("git_release=debug,warn").unwrap_or_else(|_| EnvFilter::new("warn"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = config::load_config(cli.config.as_deref()).context("Error loading config")?;

    match cli.command {
        Command::Analyze { target } => analyze(&config, &target),
        Command::Changelog { target, output } => changelog(&config, &target, output),
        Command::Release {
            target,
            dry_run,
            changelog,
            yes,
        } => release(&config, &target, dry_run, changelog, yes),
        Command::Notify {
            success,
            failure: _,
            version,
            release_type,
            branch,
        } => {
            let kind = if success {
                NotificationKind::Success
            } else {
                NotificationKind::Failure
            };
            notify(&config, kind, version, release_type, branch)
        }
        Command::Branches => {
            ui::display_branches(&config.branches);
            Ok(())
        }
    }
}

fn open_repo(target: &Target) -> Result<Git2Repository> {
    Git2Repository::open(&target.repo)
        .with_context(|| format!("Git repository error at '{}'", target.repo.display()))
}

fn plan(config: &Config, target: &Target) -> Result<ReleasePlan> {
    let repo = open_repo(target)?;
    let branch = resolve_branch(&repo, target.branch.as_deref())?;
    let plan = plan_release(&repo, config, &branch)?;
    for warning in &plan.warnings {
        ui::display_boundary_warning(warning);
    }
    Ok(plan)
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn analyze(config: &Config, target: &Target) -> Result<()> {
    let plan = plan(config, target)?;
    ui::display_analysis(&plan.analysis, &plan.branch);

    match &plan.next_release {
        Some(next) => ui::display_next_release(plan.last_release(), next),
        None => ui::display_status("No release: no commit calls for a new version"),
    }
    Ok(())
}

fn changelog(config: &Config, target: &Target, output: Option<PathBuf>) -> Result<()> {
    let plan = plan(config, target)?;
    let Some(notes) = plan.release_notes(config, today()) else {
        ui::display_status("No release: nothing to add to the changelog");
        return Ok(());
    };

    match output {
        Some(path) => {
            git_release::changelog::prepend_changelog(&path, &notes.render())
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            ui::display_success(&format!("Release notes written to {}", path.display()));
        }
        None => print!("{}", notes.render()),
    }
    Ok(())
}

fn release(
    config: &Config,
    target: &Target,
    dry_run: bool,
    changelog_file: Option<PathBuf>,
    yes: bool,
) -> Result<()> {
    let repo = open_repo(target)?;
    let dispatcher = dispatcher_for(&config.notifications)?;

    if !dry_run && !yes {
        let branch = resolve_branch(&repo, target.branch.as_deref())?;
        let preview = plan_release(&repo, config, &branch)?;
        match &preview.next_release {
            Some(next) => {
                ui::display_next_release(preview.last_release(), next);
                if !ui::confirm_action(&format!("Create release {}?", next.git_tag))? {
                    println!("Operation cancelled by user.");
                    return Ok(());
                }
            }
            None => {
                ui::display_status("No release: no commit calls for a new version");
                return Ok(());
            }
        }
    }

    let args = ReleaseWorkflowArgs {
        branch: target.branch.clone(),
        dry_run,
        changelog_file,
        date: today(),
    };
    let context = TemplateContext::new().with_process_env();

    match run_release_workflow(&repo, config, &args, dispatcher.as_ref(), context)? {
        WorkflowOutcome::NoRelease(plan) => {
            for warning in &plan.warnings {
                ui::display_boundary_warning(warning);
            }
            ui::display_status("No release: no commit calls for a new version");
        }
        WorkflowOutcome::Released(result) => {
            for warning in &result.plan.warnings {
                ui::display_boundary_warning(warning);
            }
            if dry_run {
                ui::display_analysis(&result.plan.analysis, &result.plan.branch);
                ui::display_next_release(result.plan.last_release(), &result.next_release);
                ui::display_status("Dry run, release notes would be:");
                print!("{}", result.notes.render());
            } else {
                ui::display_success(&format!(
                    "Released {} on branch {}",
                    result.next_release.git_tag, result.plan.branch
                ));
            }
        }
    }
    Ok(())
}

fn notify(
    config: &Config,
    kind: NotificationKind,
    version: Option<String>,
    level: ReleaseLevel,
    branch: Option<String>,
) -> Result<()> {
    let notifier = Notifier::new(&config.notifications)?;
    let mut context = TemplateContext::new().with_process_env();

    if let Some(branch) = branch {
        context = context.with_branch(branch);
    }
    if let Some(text) = version {
        let version = git_release::domain::parse_version(&text)?;
        let git_tag = config.tag_format()?.format(&version);
        context = context.with_next_release(NextRelease {
            version,
            git_tag,
            level,
            channel: None,
        });
    }

    match notifier.render(kind, &context)? {
        Some(notification) => println!("{}", notification.body),
        None => ui::display_status(&format!("The {} template is disabled", kind.name())),
    }
    Ok(())
}

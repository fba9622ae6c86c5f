//! Release notifications
//!
//! Templates from the configuration are rendered with a [`TemplateContext`]
//! and handed to a [`Dispatcher`]. Delivery is fire-and-forget: transport
//! failures are logged and never fail the release.

pub mod dispatch;
pub mod template;

pub use dispatch::{
    dispatch_permissive, CommandDispatcher, Dispatcher, Notification, NotificationKind,
    RecordingDispatcher, StdoutDispatcher,
};
pub use template::{Template, TemplateContext};

use crate::config::NotificationConfig;
use crate::error::Result;
use tracing::debug;

/// Pick the transport configured in `notifications.command`
pub fn dispatcher_for(config: &NotificationConfig) -> Result<Box<dyn Dispatcher>> {
    match &config.command {
        Some(command) => Ok(Box::new(CommandDispatcher::new(command)?)),
        None => Ok(Box::new(StdoutDispatcher)),
    }
}

/// Renders the configured templates
#[derive(Debug, Clone)]
pub struct Notifier {
    success: Template,
    failure: Template,
}

impl Notifier {
    /// Parse both templates and check their placeholders, so a bad
    /// template is reported before anything is released
    pub fn new(config: &NotificationConfig) -> Result<Self> {
        let success = Template::parse(&config.success)?;
        success.check_placeholders(true)?;
        let failure = Template::parse(&config.failure)?;
        failure.check_placeholders(false)?;
        Ok(Notifier { success, failure })
    }

    /// Render the notification for `kind`; `None` when that template is disabled
    pub fn render(
        &self,
        kind: NotificationKind,
        context: &TemplateContext,
    ) -> Result<Option<Notification>> {
        let template = match kind {
            NotificationKind::Success => &self.success,
            NotificationKind::Failure => &self.failure,
        };

        if template.is_empty() {
            debug!(kind = kind.name(), "notification template disabled");
            return Ok(None);
        }

        let body = template.render(context)?;
        Ok(Some(Notification::new(kind, body)))
    }

    /// Render and dispatch; returns whether a notification was delivered
    pub fn notify(
        &self,
        kind: NotificationKind,
        context: &TemplateContext,
        metadata: &[(&str, String)],
        dispatcher: &dyn Dispatcher,
    ) -> Result<bool> {
        let Some(mut notification) = self.render(kind, context)? else {
            return Ok(false);
        };
        for (key, value) in metadata {
            notification = notification.with_metadata(*key, value.clone());
        }
        Ok(dispatch_permissive(dispatcher, &notification))
    }
}

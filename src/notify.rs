use crate::diff::StatusChange;
#[cfg(feature = "desktop-notify")]
use crate::store::ProjectStatus;
#[cfg(feature = "desktop-notify")]
use notify_rust::Urgency;

/// Summary, icon and urgency for a change. A project going down outranks one coming up.
#[cfg(feature = "desktop-notify")]
fn presentation(to: ProjectStatus) -> (&'static str, &'static str, Urgency) {
    match to {
        ProjectStatus::Running => ("Project started", "dialog-information", Urgency::Low),
        ProjectStatus::Stopped => ("Project stopped", "dialog-warning", Urgency::Normal),
    }
}

#[cfg(feature = "desktop-notify")]
pub fn send_desktop(change: &StatusChange) {
    use notify_rust::Notification;

    let (summary, icon, urgency) = presentation(change.to);

    if let Err(e) = Notification::new()
        .summary(summary)
        .body(&change.message())
        .icon(icon)
        .urgency(urgency)
        .show()
    {
        tracing::debug!("desktop notification failed: {e}");
    }
}

#[cfg(not(feature = "desktop-notify"))]
pub fn send_desktop(change: &StatusChange) {
    tracing::debug!(project = %change.project, "desktop notifications disabled at build time");
}

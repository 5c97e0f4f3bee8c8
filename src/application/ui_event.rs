use serde::Serialize;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MessageDuration {
    #[default]
    Short,
    Long,
    Indefinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SnackbarKind {
    #[default]
    Default,
    Error,
    Warning,
}

/// One-shot notification for the UI, distinct from persistent screen state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UiEvent {
    ShowSnackbar {
        message: String,
        action_label: Option<String>,
        duration: MessageDuration,
        kind: SnackbarKind,
    },
    ShowErrorMessage {
        message: String,
        can_retry: bool,
        action_label: String,
        duration: MessageDuration,
    },
    ShowWarningMessage {
        message: String,
        action_label: String,
        duration: MessageDuration,
    },
    ShowErrorDialog {
        message: String,
        can_retry: bool,
        action_label: String,
    },
    ShowSuccessDialog {
        title: String,
        message: String,
        pop_back_stack: bool,
    },
}

impl UiEvent {
    pub fn snackbar(message: impl Into<String>) -> Self {
        Self::ShowSnackbar {
            message: message.into(),
            action_label: None,
            duration: MessageDuration::Short,
            kind: SnackbarKind::Default,
        }
    }

    pub fn error_message(message: impl Into<String>, can_retry: bool) -> Self {
        Self::ShowErrorMessage {
            message: message.into(),
            can_retry,
            action_label: "Retry".to_string(),
            duration: MessageDuration::Short,
        }
    }

    pub fn warning_message(message: impl Into<String>) -> Self {
        Self::ShowWarningMessage {
            message: message.into(),
            action_label: String::new(),
            duration: MessageDuration::Short,
        }
    }

    pub fn error_dialog(message: impl Into<String>, can_retry: bool) -> Self {
        Self::ShowErrorDialog {
            message: message.into(),
            can_retry,
            action_label: "Retry".to_string(),
        }
    }

    pub fn success_dialog(
        title: impl Into<String>,
        message: impl Into<String>,
        pop_back_stack: bool,
    ) -> Self {
        Self::ShowSuccessDialog {
            title: title.into(),
            message: message.into(),
            pop_back_stack,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::ShowSnackbar { message, .. }
            | Self::ShowErrorMessage { message, .. }
            | Self::ShowWarningMessage { message, .. }
            | Self::ShowErrorDialog { message, .. }
            | Self::ShowSuccessDialog { message, .. } => message,
        }
    }
}

/// Single-slot mailbox for [`UiEvent`]s.
///
/// Posting replaces whatever is pending (last write wins). The consumer takes
/// the event with [`UiEventSlot::consume`], which leaves the slot empty.
#[derive(Debug)]
pub struct UiEventSlot {
    slot: watch::Sender<Option<UiEvent>>,
}

impl Default for UiEventSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl UiEventSlot {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self { slot }
    }

    pub fn post(&self, event: UiEvent) {
        tracing::debug!(?event, "Posting UI event");
        if let Some(dropped) = self.slot.send_replace(Some(event)) {
            tracing::debug!(?dropped, "Unconsumed UI event overwritten");
        }
    }

    pub fn pending(&self) -> Option<UiEvent> {
        self.slot.borrow().clone()
    }

    pub fn consume(&self) -> Option<UiEvent> {
        self.slot.send_replace(None)
    }

    /// Wakes whenever an event is posted or consumed.
    pub fn subscribe(&self) -> watch::Receiver<Option<UiEvent>> {
        self.slot.subscribe()
    }
}

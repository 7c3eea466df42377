/// How long a status message stays visible.
pub const TOAST_DURATION_MS: u64 = 2000;

/// Transient status line. Each `show` hands out a ticket; only the newest
/// ticket can clear the message, so an old timer never hides a newer one.
#[derive(Clone, Debug, Default)]
pub struct Toast {
	message: Option<String>,
	ticket: u64,
}

impl Toast {
	pub fn show(&mut self, message: impl Into<String>) -> u64 {
		self.ticket += 1;
		self.message = Some(message.into());
		self.ticket
	}

	pub fn clear(&mut self, ticket: u64) -> bool {
		if ticket != self.ticket || self.message.is_none() {
			return false;
		}
		self.message = None;
		true
	}

	pub fn message(&self) -> Option<&str> {
		self.message.as_deref()
	}
}

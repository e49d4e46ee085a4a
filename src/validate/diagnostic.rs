use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
	/// Reported, but the settings are still usable.
	Warning,
	/// The settings must be fixed before slicing.
	Error,
}

/// A validation finding: what is wrong, the values involved, and where to fix it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
	/// Name of the rule that produced this finding.
	pub rule: &'static str,
	pub severity: Severity,
	pub message: String,
	pub detail: String,
	/// Navigation path to the setting in the settings UI.
	pub location: String,
}

impl Diagnostic {
	pub fn error(
		rule: &'static str,
		message: impl Into<String>,
		detail: impl Into<String>,
		location: impl Into<String>,
	) -> Self {
		Diagnostic {
			rule,
			severity: Severity::Error,
			message: message.into(),
			detail: detail.into(),
			location: location.into(),
		}
	}

	pub fn warning(
		rule: &'static str,
		message: impl Into<String>,
		detail: impl Into<String>,
		location: impl Into<String>,
	) -> Self {
		Diagnostic {
			severity: Severity::Warning,
			..Diagnostic::error(rule, message, detail, location)
		}
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}\n\n{}", self.message, self.detail)?;
		if !self.location.is_empty() {
			write!(f, "\n\n{}", self.location)?;
		}
		Ok(())
	}
}

/// Receives diagnostics produced while validating a profile.
pub trait DiagnosticSink {
	fn report(&mut self, diagnostic: &Diagnostic);
}

/// Collects diagnostics in order, mostly for tests and batch tooling.
impl DiagnosticSink for Vec<Diagnostic> {
	fn report(&mut self, diagnostic: &Diagnostic) {
		self.push(diagnostic.clone());
	}
}

/// Routes diagnostics to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
	fn report(&mut self, diagnostic: &Diagnostic) {
		match diagnostic.severity {
			Severity::Warning => tracing::warn!(
				rule = diagnostic.rule,
				location = %diagnostic.location,
				"{}: {}",
				diagnostic.message,
				diagnostic.detail
			),
			Severity::Error => tracing::error!(
				rule = diagnostic.rule,
				location = %diagnostic.location,
				"{}: {}",
				diagnostic.message,
				diagnostic.detail
			),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display_joins_sections() {
		let diagnostic = Diagnostic::error("r", "Bad value.", "It is 3.", "Location: 'General'");
		assert_eq!(diagnostic.to_string(), "Bad value.\n\nIt is 3.\n\nLocation: 'General'");

		let diagnostic = Diagnostic::warning("r", "Odd value.", "It is 4.", "");
		assert_eq!(diagnostic.severity, Severity::Warning);
		assert_eq!(diagnostic.to_string(), "Odd value.\n\nIt is 4.");
	}

	#[test]
	fn test_vec_sink_collects_in_order() {
		let mut sink: Vec<Diagnostic> = Vec::new();
		sink.report(&Diagnostic::error("a", "", "", ""));
		sink.report(&Diagnostic::warning("b", "", "", ""));
		assert_eq!(sink.iter().map(|d| d.rule).collect::<Vec<_>>(), vec!["a", "b"]);
	}
}

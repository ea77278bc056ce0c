use colored::Colorize;
use thiserror::Error;

// =============================================================================
// Simple Factory pattern: notification channels created from a tag
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
enum NotificationError {
    #[error("channel '{tag}' is not supported (supported: {supported})")]
    UnsupportedChannel { tag: String, supported: String },

    #[error("recipient must not be empty")]
    EmptyRecipient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Priority {
    High = 1,
    Medium = 2,
    Low = 3,
}

trait Notification: std::fmt::Debug {
    fn kind(&self) -> &'static str;
    fn priority(&self) -> Priority;
    fn send(&self, message: &str, recipient: &str) -> Result<(), NotificationError>;
}

// =============================================================================
// Concrete channels
// =============================================================================

#[derive(Debug)]
struct EmailNotification;
#[derive(Debug)]
struct SmsNotification;
#[derive(Debug)]
struct SlackNotification;
#[derive(Debug)]
struct WhatsAppNotification;

fn require_recipient(recipient: &str) -> Result<(), NotificationError> {
    if recipient.trim().is_empty() {
        return Err(NotificationError::EmptyRecipient);
    }
    Ok(())
}

impl Notification for EmailNotification {
    fn kind(&self) -> &'static str {
        "email"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn send(&self, message: &str, recipient: &str) -> Result<(), NotificationError> {
        require_recipient(recipient)?;
        println!("  [email] to {recipient}: {message}");
        Ok(())
    }
}

impl Notification for SmsNotification {
    fn kind(&self) -> &'static str {
        "sms"
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn send(&self, message: &str, recipient: &str) -> Result<(), NotificationError> {
        require_recipient(recipient)?;
        println!("  [sms] to {recipient}: {message}");
        Ok(())
    }
}

impl Notification for SlackNotification {
    fn kind(&self) -> &'static str {
        "slack"
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn send(&self, message: &str, recipient: &str) -> Result<(), NotificationError> {
        require_recipient(recipient)?;
        println!("  [slack] to channel {recipient}: {message}");
        Ok(())
    }
}

impl Notification for WhatsAppNotification {
    fn kind(&self) -> &'static str {
        "whatsapp"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn send(&self, message: &str, recipient: &str) -> Result<(), NotificationError> {
        require_recipient(recipient)?;
        println!("  [whatsapp] to {recipient}: {message}");
        Ok(())
    }
}

// =============================================================================
// The factory
// =============================================================================

struct NotificationFactory;

impl NotificationFactory {
    fn create(tag: &str) -> Result<Box<dyn Notification>, NotificationError> {
        match tag {
            "email" => Ok(Box::new(EmailNotification)),
            "sms" => Ok(Box::new(SmsNotification)),
            "slack" => Ok(Box::new(SlackNotification)),
            "whatsapp" => Ok(Box::new(WhatsAppNotification)),
            other => Err(NotificationError::UnsupportedChannel {
                tag: other.to_string(),
                supported: Self::supported().join(", "),
            }),
        }
    }

    fn supported() -> Vec<&'static str> {
        vec!["email", "sms", "slack", "whatsapp"]
    }

    fn is_supported(tag: &str) -> bool {
        Self::supported().contains(&tag)
    }
}

// =============================================================================
// Dispatcher and service layer on top of the factory
// =============================================================================

#[derive(Debug, PartialEq)]
struct DispatchOutcome {
    kind: &'static str,
    priority: Priority,
}

struct Dispatcher;

impl Dispatcher {
    fn dispatch(
        &self,
        tag: &str,
        message: &str,
        recipient: &str,
    ) -> Result<DispatchOutcome, NotificationError> {
        // validate the tag before building anything
        if !NotificationFactory::is_supported(tag) {
            return Err(NotificationError::UnsupportedChannel {
                tag: tag.to_string(),
                supported: NotificationFactory::supported().join(", "),
            });
        }

        let channel = NotificationFactory::create(tag)?;
        channel.send(message, recipient)?;
        Ok(DispatchOutcome {
            kind: channel.kind(),
            priority: channel.priority(),
        })
    }
}

/// Scenario helpers showing the factory being reused from above.
struct NotificationService {
    dispatcher: Dispatcher,
}

impl NotificationService {
    fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    fn welcome(&self, email: &str, name: &str) -> Result<DispatchOutcome, NotificationError> {
        self.dispatcher
            .dispatch("email", &format!("Welcome aboard, {name}!"), email)
    }

    fn alert(&self, phone: &str, alert: &str) -> Result<DispatchOutcome, NotificationError> {
        self.dispatcher.dispatch("sms", alert, phone)
    }

    fn team(&self, channel: &str, message: &str) -> Result<DispatchOutcome, NotificationError> {
        self.dispatcher.dispatch("slack", message, channel)
    }

    fn urgent(&self, number: &str, message: &str) -> Result<DispatchOutcome, NotificationError> {
        self.dispatcher.dispatch("whatsapp", message, number)
    }
}

// =============================================================================
// Demo (cargo run)
// =============================================================================

fn main() {
    let dispatcher = Dispatcher;

    println!("== Dispatch table ==");
    let attempts = [
        ("email", "Your account is ready", "user@example.com"),
        ("sms", "Verification code: 123456", "+55 11 99999-9999"),
        ("slack", "New task assigned to you", "#general"),
        ("whatsapp", "Reminder: meeting in 30 minutes", "+5511999999999"),
        ("telegram", "This should fail", "@someone"),
    ];

    for (tag, message, recipient) in attempts {
        println!("-- {tag} --");
        match dispatcher.dispatch(tag, message, recipient) {
            Ok(outcome) => println!(
                "{} sent via {} (priority {:?})",
                "ok".green(),
                outcome.kind,
                outcome.priority
            ),
            Err(err) => println!("{} {err}", "error:".red()),
        }
    }

    println!("\n== Service helpers reusing the factory ==");
    let service = NotificationService::new(Dispatcher);
    service.welcome("new@example.com", "Joana").unwrap();
    service.alert("+55 11 98888-0000", "System under maintenance").unwrap();
    service.team("#dev", "Deploy finished").unwrap();
    service.urgent("+5511999999999", "Immediate action required").unwrap();

    println!("\n== Supported channels ==");
    for tag in NotificationFactory::supported() {
        let channel = NotificationFactory::create(tag).unwrap();
        println!("- {tag}: priority {:?}", channel.priority());
    }
    println!("telegram supported: {}", NotificationFactory::is_supported("telegram"));
}

// =============================================================================
// Tests (cargo test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_builds_every_supported_channel() {
        for tag in NotificationFactory::supported() {
            let channel = NotificationFactory::create(tag).unwrap();
            assert_eq!(channel.kind(), tag);
        }
    }

    #[test]
    fn factory_rejects_unknown_tag() {
        let err = NotificationFactory::create("telegram").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("telegram"));
        assert!(message.contains("email"));
    }

    #[test]
    fn support_probe() {
        assert!(NotificationFactory::is_supported("sms"));
        assert!(!NotificationFactory::is_supported("pigeon"));
    }

    #[test]
    fn priorities_are_distinct_per_channel() {
        assert_eq!(NotificationFactory::create("email").unwrap().priority(), Priority::High);
        assert_eq!(NotificationFactory::create("sms").unwrap().priority(), Priority::Medium);
        assert_eq!(NotificationFactory::create("slack").unwrap().priority(), Priority::Low);
        assert!(Priority::High < Priority::Low);
    }

    #[test]
    fn dispatch_returns_the_channel_metadata() {
        let outcome = Dispatcher.dispatch("email", "hi", "a@b.c").unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome {
                kind: "email",
                priority: Priority::High
            }
        );
    }

    #[test]
    fn dispatch_validates_before_creating() {
        assert!(matches!(
            Dispatcher.dispatch("pigeon", "hi", "roof"),
            Err(NotificationError::UnsupportedChannel { .. })
        ));
    }

    #[test]
    fn empty_recipient_is_refused() {
        assert_eq!(
            Dispatcher.dispatch("sms", "hi", "  "),
            Err(NotificationError::EmptyRecipient)
        );
    }

    #[test]
    fn service_helpers_pick_the_right_channel() {
        let service = NotificationService::new(Dispatcher);
        assert_eq!(service.welcome("a@b.c", "Ana").unwrap().kind, "email");
        assert_eq!(service.alert("+55", "x").unwrap().kind, "sms");
        assert_eq!(service.team("#dev", "x").unwrap().kind, "slack");
        assert_eq!(service.urgent("+55", "x").unwrap().kind, "whatsapp");
    }
}

//! Enumerations describing an automation rule and the per-type channel table.

text_enum! {
    /// What an automation rule sends or does when it fires.
    #[sqlx(type_name = "rule_kind")]
    pub enum RuleKind {
        /// Templated email.
        Email => "email",
        /// Document delivered with a templated email.
        Document => "document",
        /// In-app notification.
        Notification => "notification",
        /// Assignment handed out to recipients.
        Assignment => "assignment",
        /// Generic reminder.
        Reminder => "reminder",
        /// Certificate issuance.
        Certificate => "certificate",
        /// Payment request or receipt.
        Payment => "payment",
        /// Enrollment confirmation.
        Enrollment => "enrollment",
        /// Completion notice.
        Completion => "completion",
        /// Feedback request (usually with questionnaires attached).
        Feedback => "feedback",
        /// Meeting invitation.
        Meeting => "meeting",
        /// Resource sharing.
        Resource => "resource",
    }
}

text_enum! {
    /// Who receives the output of a rule.
    #[sqlx(type_name = "rule_recipient")]
    pub enum Recipient {
        /// Course or session trainers.
        Trainer => "trainer",
        /// Enrolled learners.
        Learner => "learner",
        /// The learners' companies.
        Company => "company",
        /// Organization administrators.
        Admin => "admin",
    }
}

text_enum! {
    /// Delivery channel of a rule.
    #[sqlx(type_name = "rule_dest_type")]
    pub enum DestinationType {
        /// Email transport.
        Email => "email",
        /// In-app notification center.
        Notification => "notification",
        /// HTTP callback to an external URL.
        Webhook => "webhook",
    }
}

text_enum! {
    /// Lifecycle event a trigger is measured from.
    #[sqlx(type_name = "rule_ref_date")]
    pub enum RefDate {
        /// Learner enrollment.
        Enrollment => "enrollment",
        /// Course or session completion.
        Completion => "completion",
        /// Course or session start.
        Start => "start",
        /// A custom date supplied elsewhere.
        Custom => "custom",
    }
}

text_enum! {
    /// Position of the trigger relative to its reference date.
    #[sqlx(type_name = "rule_time_type")]
    pub enum TimeType {
        /// `n_days` before the reference date.
        Before => "before",
        /// `n_days` after the reference date.
        After => "after",
        /// On the reference date itself.
        On => "on",
    }
}

/// What a rule of a given kind must carry in its channel payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRequirements {
    /// An `email_id` template reference is mandatory.
    pub email_template: bool,
}

const CHANNEL_TABLE: &[(RuleKind, ChannelRequirements)] = &[
    (RuleKind::Email, ChannelRequirements { email_template: true }),
    (RuleKind::Document, ChannelRequirements { email_template: true }),
    (RuleKind::Notification, ChannelRequirements { email_template: false }),
    (RuleKind::Assignment, ChannelRequirements { email_template: false }),
    (RuleKind::Reminder, ChannelRequirements { email_template: false }),
    (RuleKind::Certificate, ChannelRequirements { email_template: false }),
    (RuleKind::Payment, ChannelRequirements { email_template: false }),
    (RuleKind::Enrollment, ChannelRequirements { email_template: false }),
    (RuleKind::Completion, ChannelRequirements { email_template: false }),
    (RuleKind::Feedback, ChannelRequirements { email_template: false }),
    (RuleKind::Meeting, ChannelRequirements { email_template: false }),
    (RuleKind::Resource, ChannelRequirements { email_template: false }),
];

impl RuleKind {
    /// Look up the channel requirements for this kind.
    pub fn requirements(&self) -> ChannelRequirements {
        CHANNEL_TABLE
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, req)| *req)
            .unwrap_or(ChannelRequirements { email_template: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_is_in_the_table() {
        for kind in RuleKind::ALL {
            assert!(CHANNEL_TABLE.iter().any(|(k, _)| k == kind), "{kind} missing");
        }
        assert_eq!(CHANNEL_TABLE.len(), RuleKind::ALL.len());
    }

    #[test]
    fn test_templated_kinds() {
        let templated: Vec<_> = RuleKind::ALL
            .iter()
            .filter(|k| k.requirements().email_template)
            .collect();
        assert_eq!(templated, vec![&RuleKind::Email, &RuleKind::Document]);
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("webhook".parse::<DestinationType>().unwrap(), DestinationType::Webhook);
        assert_eq!("ON".parse::<TimeType>().unwrap(), TimeType::On);
        let err = "sms".parse::<DestinationType>().unwrap_err();
        assert!(err.message.contains("email, notification, webhook"));
    }
}

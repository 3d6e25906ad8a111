// ============================================================================
// Business Rules
// ============================================================================
//
// A business rule is a named predicate over domain state plus the message
// reported when it does not hold. Aggregates evaluate rules before emitting
// events; broken rules surface as `BusinessRuleViolation`.
//
// ============================================================================

pub trait BusinessRule {
    fn is_broken(&self) -> bool;

    fn message(&self) -> String;
}

/// Rule built from an already evaluated condition
#[derive(Debug, Clone)]
pub struct ConditionMustBeTrueRule {
    condition_to_be_valid: bool,
    error_message: String,
}

impl ConditionMustBeTrueRule {
    pub fn new(condition_to_be_valid: bool, error_message: impl Into<String>) -> Self {
        Self {
            condition_to_be_valid,
            error_message: error_message.into(),
        }
    }
}

impl BusinessRule for ConditionMustBeTrueRule {
    fn is_broken(&self) -> bool {
        !self.condition_to_be_valid
    }

    fn message(&self) -> String {
        self.error_message.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Business rule broken: {}", .messages.join("; "))]
pub struct BusinessRuleViolation {
    pub messages: Vec<String>,
}

impl BusinessRuleViolation {
    pub fn first_message(&self) -> &str {
        self.messages.first().map(String::as_str).unwrap_or_default()
    }
}

pub fn check_rule(rule: &dyn BusinessRule) -> Result<(), BusinessRuleViolation> {
    if rule.is_broken() {
        return Err(BusinessRuleViolation {
            messages: vec![rule.message()],
        });
    }

    Ok(())
}

/// Evaluate every rule and report all broken ones together
pub fn check_rules(rules: &[&dyn BusinessRule]) -> Result<(), BusinessRuleViolation> {
    let messages: Vec<String> = rules
        .iter()
        .filter(|rule| rule.is_broken())
        .map(|rule| rule.message())
        .collect();

    if messages.is_empty() {
        Ok(())
    } else {
        tracing::debug!(broken = messages.len(), "Business rule validation failed");
        Err(BusinessRuleViolation { messages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_rule() {
        let holds = ConditionMustBeTrueRule::new(true, "never shown");
        let broken = ConditionMustBeTrueRule::new(false, "quantity must be positive");

        assert!(!holds.is_broken());
        assert!(broken.is_broken());
        assert_eq!(broken.message(), "quantity must be positive");
    }

    #[test]
    fn test_check_rule() {
        assert!(check_rule(&ConditionMustBeTrueRule::new(true, "ok")).is_ok());

        let err = check_rule(&ConditionMustBeTrueRule::new(false, "basket is empty")).unwrap_err();
        assert_eq!(err.messages, vec!["basket is empty".to_string()]);
        assert_eq!(err.first_message(), "basket is empty");
    }

    #[test]
    fn test_check_rules_collects_every_broken_rule() {
        let a = ConditionMustBeTrueRule::new(false, "first");
        let b = ConditionMustBeTrueRule::new(true, "second");
        let c = ConditionMustBeTrueRule::new(false, "third");

        let err = check_rules(&[&a, &b, &c]).unwrap_err();
        assert_eq!(err.messages, vec!["first".to_string(), "third".to_string()]);
        assert_eq!(err.to_string(), "Business rule broken: first; third");
    }

    #[test]
    fn test_check_rules_passes_when_nothing_broken() {
        let a = ConditionMustBeTrueRule::new(true, "first");
        assert!(check_rules(&[&a]).is_ok());
        assert!(check_rules(&[]).is_ok());
    }
}

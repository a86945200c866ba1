//! Risk classification for detected conflicts

use crate::models::Entity;
use infrarisk_core::models::{MatchRecord, RiskLevel};
use infrarisk_core::normalize::attr;

/// Condition ratings that mark an area asset as high risk
pub const HIGH_RISK_CODES: [u8; 2] = [3, 4];

/// Attribute used when a linear asset carries no descriptive data
pub const UNKNOWN_ATTRIBUTE: &str = "unknown";

/// Map a condition code to a risk level.
///
/// Missing or unreadable codes classify as LOW.
pub fn risk_level(condition: Option<u8>) -> RiskLevel {
    match condition {
        Some(code) if HIGH_RISK_CODES.contains(&code) => RiskLevel::High,
        _ => RiskLevel::Low,
    }
}

/// Build the match record for an intersecting area/linear pair
pub fn classify(area: &Entity, linear: &Entity) -> MatchRecord {
    let linear_attribute = linear
        .attribute_text(attr::INSTALLATION_YEAR)
        .or_else(|| linear.attribute_text(attr::MATERIAL))
        .unwrap_or_else(|| UNKNOWN_ATTRIBUTE.to_string());

    MatchRecord {
        area_entity_id: area.id.clone(),
        area_label: area.display_label().to_string(),
        area_condition: area.condition_text(),
        linear_entity_id: linear.id.clone(),
        linear_attribute,
        risk_level: risk_level(area.condition()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bridge(code: serde_json::Value) -> Entity {
        Entity::area("A1", &[(132.4, 34.4)]).with_label("Ohashi").with_condition(code)
    }

    #[test]
    fn test_risk_level_codes() {
        assert_eq!(risk_level(Some(3)), RiskLevel::High);
        assert_eq!(risk_level(Some(4)), RiskLevel::High);
        assert_eq!(risk_level(Some(1)), RiskLevel::Low);
        assert_eq!(risk_level(Some(2)), RiskLevel::Low);
        assert_eq!(risk_level(Some(9)), RiskLevel::Low);
        assert_eq!(risk_level(None), RiskLevel::Low);
    }

    #[test]
    fn test_classify_coerces_condition() {
        let pipe = Entity::linear("P1", &[(0.0, 0.0), (1.0, 1.0)]);

        assert_eq!(classify(&bridge(json!("4")), &pipe).risk_level, RiskLevel::High);
        assert_eq!(classify(&bridge(json!(" 3 ")), &pipe).risk_level, RiskLevel::High);
        assert_eq!(classify(&bridge(json!(3.0)), &pipe).risk_level, RiskLevel::High);
        assert_eq!(classify(&bridge(json!("III")), &pipe).risk_level, RiskLevel::Low);
        assert_eq!(classify(&bridge(json!(2)), &pipe).risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_classify_fields() {
        let pipe = Entity::linear("P1", &[(0.0, 0.0), (1.0, 1.0)])
            .with_attribute(attr::INSTALLATION_YEAR, 1978)
            .with_attribute(attr::MATERIAL, "cast iron");

        let record = classify(&bridge(json!(4)), &pipe);
        assert_eq!(record.area_entity_id, "A1");
        assert_eq!(record.area_label, "Ohashi");
        assert_eq!(record.area_condition.as_deref(), Some("4"));
        assert_eq!(record.linear_entity_id, "P1");
        assert_eq!(record.linear_attribute, "1978");
    }

    #[test]
    fn test_linear_attribute_fallbacks() {
        let area = Entity::area("A2", &[(0.0, 0.0)]);
        let by_material =
            Entity::linear("P2", &[(0.0, 0.0)]).with_attribute(attr::MATERIAL, "PVC");
        let bare = Entity::linear("P3", &[(0.0, 0.0)]);

        assert_eq!(classify(&area, &by_material).linear_attribute, "PVC");

        let record = classify(&area, &bare);
        assert_eq!(record.linear_attribute, UNKNOWN_ATTRIBUTE);
        assert_eq!(record.area_label, "A2");
        assert_eq!(record.area_condition, None);
        assert_eq!(record.risk_level, RiskLevel::Low);
    }
}

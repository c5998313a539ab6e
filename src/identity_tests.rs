use super::*;

fn identity(number: &str, rarity: Option<&str>) -> CardIdentity {
    CardIdentity {
        name: "Jolteon ex".to_string(),
        number: number.to_string(),
        local_name: "サンダースex".to_string(),
        rarity: rarity.map(|r| r.to_string()),
        is_japanese: false,
        is_slab: false,
        grade: None,
    }
}

mod rarity_token_tests {
    use super::*;

    #[test]
    fn strips_symbols_and_uppercases() {
        assert_eq!(
            identity("209/SAR", Some("#sar")).rarity_token(),
            Some("SAR".to_string())
        );
    }

    #[test]
    fn equivalent_spellings_collapse() {
        let token = |r| identity("209/SAR", Some(r)).rarity_token();
        assert_eq!(token("SAR"), token("sar"));
        assert_eq!(token("SAR"), token("#SAR"));
    }

    #[test]
    fn falls_back_to_number_suffix() {
        assert_eq!(
            identity("209/SAR", None).rarity_token(),
            Some("SAR".to_string())
        );
    }

    #[test]
    fn numeric_suffix_yields_none() {
        // "151/165" has no alphabetic rarity component
        assert_eq!(identity("151/165", None).rarity_token(), None);
    }

    #[test]
    fn no_rarity_no_slash_yields_none() {
        assert_eq!(identity("209", None).rarity_token(), None);
    }
}

mod number_helpers_tests {
    use super::*;

    #[test]
    fn clean_number_strips_hash() {
        assert_eq!(identity("#209/SAR", None).clean_number(), "209/SAR");
    }

    #[test]
    fn bare_number_drops_rarity_suffix() {
        assert_eq!(identity("209/SAR", None).bare_number(), "209");
        assert_eq!(identity("209", None).bare_number(), "209");
    }
}

mod raw_identity_tests {
    use super::super::RawIdentity;

    #[test]
    fn tolerates_absent_fields() {
        let raw: RawIdentity = serde_json::from_str(r#"{"cardName": "Pikachu"}"#).unwrap();
        let identity = raw.into_identity().unwrap();
        assert_eq!(identity.name, "Pikachu");
        assert_eq!(identity.number, "");
        assert!(!identity.is_japanese);
        assert!(!identity.is_slab);
        assert!(identity.grade.is_none());
    }

    #[test]
    fn missing_name_is_a_classifier_failure() {
        let raw: RawIdentity = serde_json::from_str(r#"{"cardNumber": "209/SAR"}"#).unwrap();
        assert!(raw.into_identity().is_err());
    }

    #[test]
    fn blank_rarity_becomes_none() {
        let raw: RawIdentity =
            serde_json::from_str(r#"{"cardName": "Pikachu", "rarity": "  "}"#).unwrap();
        assert!(raw.into_identity().unwrap().rarity.is_none());
    }
}

mod graded_top_tests {
    use super::*;

    #[test]
    fn slab_grade_ten_is_graded_top() {
        let mut id = identity("209/SAR", Some("SAR"));
        id.is_slab = true;
        id.grade = Some(10);
        assert!(id.is_graded_top());
    }

    #[test]
    fn slab_grade_nine_is_not() {
        let mut id = identity("209/SAR", Some("SAR"));
        id.is_slab = true;
        id.grade = Some(9);
        assert!(!id.is_graded_top());
    }

    #[test]
    fn raw_card_is_not() {
        assert!(!identity("209/SAR", Some("SAR")).is_graded_top());
    }
}

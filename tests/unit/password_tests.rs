// ==============================
// tests/unit/password_tests.rs
// ==============================
//! Password scoring and confirmation matching
use formflow_lib::auth::{
    check_password_strength, check_password_strength_with, passwords_match, StrengthLevel,
};
use formflow_lib::auth::password::{CharacterClasses, MAX_SCORE, TOO_SHORT_FEEDBACK};

#[test]
fn test_short_passwords_score_zero() {
    // Diversity does not matter below the minimum length
    for pw in ["", "a", "Ab1!", "Ab1!xY2", "ÀÉÎ!1aB"] {
        let strength = check_password_strength(pw);
        assert_eq!(strength.score, 0, "{pw:?}");
        assert_eq!(strength.feedback, TOO_SHORT_FEEDBACK);
    }
}

#[test]
fn test_length_counts_characters_not_bytes() {
    // 8 characters, 16 bytes
    let pw = "éééééééé";
    assert_eq!(pw.chars().count(), 8);
    let strength = check_password_strength(pw);
    // length points 2 + symbol class 1
    assert_eq!(strength.score, 3);
}

#[test]
fn test_all_classes_score_maximum() {
    for pw in ["Abcdef1!", "Passw0rd#", "zZ9_long_password", "1aA-aaaaaaaaaaaaaaa"] {
        let strength = check_password_strength(pw);
        assert_eq!(strength.score, MAX_SCORE, "{pw:?}");
        assert_eq!(strength.level(), StrengthLevel::Strong);
        assert_eq!(strength.feedback, "Strong password!");
    }
}

#[test]
fn test_adding_a_class_never_lowers_score() {
    let base = "aaaaaaaa";
    let variants = ["aaaaaaaA", "aaaaaaa1", "aaaaaaa!"];
    let base_score = check_password_strength(base).score;
    for pw in variants {
        assert!(check_password_strength(pw).score >= base_score, "{pw:?}");
    }

    let mut pw = String::from("abcdefgh");
    let mut last = check_password_strength(&pw).score;
    for extra in ["A", "1", "%"] {
        pw.push_str(extra);
        let score = check_password_strength(&pw).score;
        assert!(score >= last);
        last = score;
    }
    assert_eq!(last, MAX_SCORE);
}

#[test]
fn test_feedback_levels() {
    // 8 lowercase: 2 length + 1 class
    assert_eq!(
        check_password_strength("abcdefgh").feedback,
        "Moderate password. Try adding more variety."
    );
    // 8 lower + upper: 2 + 2
    assert_eq!(check_password_strength("abcdefgH").feedback, "Good password.");
    // 12 chars, three classes: 2 + 3
    assert_eq!(check_password_strength("abcdefghIJ12").score, 5);
}

#[test]
fn test_character_classes() {
    let classes = CharacterClasses::of("aB3 ");
    assert_eq!(classes.count(), 4);
    // Non-ASCII letters count as symbols
    let classes = CharacterClasses::of("ß");
    assert_eq!(classes.count(), 1);
}

#[test]
fn test_custom_min_length() {
    assert_eq!(check_password_strength_with("Ab1!", 4).score, 5);
    assert_eq!(check_password_strength_with("Abcdef1!", 10).score, 0);
}

#[test]
fn test_passwords_match_is_strict() {
    assert!(passwords_match("Secret#1", "Secret#1"));
    assert!(!passwords_match("Secret#1", "secret#1"));
    assert!(!passwords_match("Secret#1", "Secret#1 "));
    assert!(!passwords_match("", ""));
}

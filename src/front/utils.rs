use crate::consts;

/// Trimmed text, `None` when nothing is left
pub fn normalize_string_or_null(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Up to two upper case initials used when a pet has no picture
pub fn initials_from_name(name: &str) -> String {
    let initials = name
        .split_whitespace()
        .take(2)
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect::<String>();

    if initials.is_empty() {
        return "?".into();
    }
    initials
}

/// Keeps digits and `+`, what dialers and wa.me understand
pub fn phone_digits(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

pub fn whatsapp_url(phone: &str) -> Option<String> {
    let digits = phone_digits(phone).replace('+', "");
    (!digits.is_empty()).then(|| format!("https://wa.me/{digits}"))
}

pub fn tel_url(phone: &str) -> Option<String> {
    let digits = phone_digits(phone);
    (!digits.is_empty() && digits != "+").then(|| format!("tel:{digits}"))
}

/// Value of an info row, a dash when missing or blank
pub fn display_or_placeholder(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => consts::EMPTY_FIELD_PLACEHOLDER.to_string(),
    }
}

/// "12.5 kg" without trailing zeros
pub fn fmt_weight(weight_kg: f64) -> String {
    let formatted = format!("{weight_kg:.2}");
    let formatted = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{formatted} kg")
}

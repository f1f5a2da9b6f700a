/// Replace `${ENV_VAR}` placeholders in raw config text.
///
/// Unset variables and malformed placeholders are left untouched.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Same as [`substitute_env`] with an injectable lookup.
fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let name = after.find('}').map(|end| &after[..end]);
        match name.filter(|n| is_var_name(n)) {
            Some(name) => {
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    },
                }
                rest = &after[name.len() + 1..];
            },
            None => {
                out.push_str("${");
                rest = after;
            },
        }
    }

    out.push_str(rest);
    out
}

fn is_var_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "TELEGRAM_TOKEN" => Some("123:ABC".into()),
            "CHANNEL" => Some("@naclyunpan".into()),
            _ => None,
        }
    }

    #[test]
    fn substitutes_known_vars() {
        assert_eq!(
            substitute_env_with("token = \"${TELEGRAM_TOKEN}\"", lookup),
            "token = \"123:ABC\""
        );
        assert_eq!(
            substitute_env_with("${CHANNEL}/${CHANNEL}", lookup),
            "@naclyunpan/@naclyunpan"
        );
    }

    #[test]
    fn leaves_unknown_var() {
        assert_eq!(
            substitute_env_with("${TOUGAO_NOT_SET_XYZ}", lookup),
            "${TOUGAO_NOT_SET_XYZ}"
        );
    }

    #[test]
    fn leaves_malformed_placeholders() {
        assert_eq!(substitute_env_with("${unterminated", lookup), "${unterminated");
        assert_eq!(substitute_env_with("${}", lookup), "${}");
        assert_eq!(
            substitute_env_with("${has space} ${CHANNEL}", lookup),
            "${has space} @naclyunpan"
        );
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(substitute_env("名称：$5 {x}"), "名称：$5 {x}");
    }
}

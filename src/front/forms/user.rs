use crate::{consts, front::errors::UserError};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

impl LoginForm {
    /// First failing rule wins, like the shared login schema
    pub fn validate(&self) -> Result<Credentials, UserError> {
        let email = self.email.trim();

        if !is_valid_email(email) {
            return Err(UserError::FormInputValueError("Email inválido".into()));
        }

        if self.password.chars().count() < consts::MIN_PASSWORD_LEN {
            return Err(UserError::FormInputValueError(
                "La contraseña debe tener al menos 6 caracteres".into(),
            ));
        }

        Ok(Credentials {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("owner@chipdog.cl"));
        assert!(is_valid_email("a.b+tag@mail.example.com"));

        assert!(!is_valid_email("owner"));
        assert!(!is_valid_email("@chipdog.cl"));
        assert!(!is_valid_email("owner@chipdog"));
        assert!(!is_valid_email("owner@@chipdog.cl"));
        assert!(!is_valid_email("own er@chipdog.cl"));
        assert!(!is_valid_email("owner@chipdog..cl"));
        assert!(!is_valid_email("owner@.cl"));
    }

    #[test]
    fn test_login_form_validation() {
        let form = LoginForm {
            email: " owner@chipdog.cl ".into(),
            password: "123456".into(),
        };
        assert_eq!(
            form.validate(),
            Ok(Credentials {
                email: "owner@chipdog.cl".into(),
                password: "123456".into()
            })
        );

        let form = LoginForm {
            email: "owner@chipdog.cl".into(),
            password: "12345".into(),
        };
        assert_eq!(
            form.validate(),
            Err(UserError::FormInputValueError(
                "La contraseña debe tener al menos 6 caracteres".into()
            ))
        );

        // the email rule is reported first
        let form = LoginForm {
            email: "nope".into(),
            password: "1".into(),
        };
        assert_eq!(
            form.validate(),
            Err(UserError::FormInputValueError("Email inválido".into()))
        );
    }
}

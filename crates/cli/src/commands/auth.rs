//! Account commands.

use shopfront_storefront::Storefront;
use shopfront_storefront::forms::{LoginForm, RegistrationForm};

use super::CommandError;

/// `shopfront auth login -e <email> -p <password>`
///
/// # Errors
///
/// Returns `CommandError::Form` for blank fields and `CommandError::Auth`
/// if the server rejects the credentials.
pub async fn login(
    app: &mut Storefront,
    email: String,
    password: String,
) -> Result<String, CommandError> {
    let form = LoginForm { email, password };
    let email = form.validate()?;
    let user = app.auth.login(email, &form.password).await?;
    let greeting = format!("Welcome back, {}!", user.name);

    Ok(with_session_note(app, greeting))
}

/// `shopfront auth register ...`
///
/// # Errors
///
/// Returns `CommandError::Form` if the form is incomplete or inconsistent
/// and `CommandError::Auth` if the server rejects the registration.
pub async fn register(
    app: &mut Storefront,
    form: &RegistrationForm,
) -> Result<String, CommandError> {
    let request = form.validate()?;
    let user = app.auth.register(&request).await?;
    let greeting = format!("Welcome, {}! Your account is ready.", user.name);

    Ok(with_session_note(app, greeting))
}

/// `shopfront auth logout`
pub async fn logout(app: &mut Storefront) -> String {
    if !app.auth.is_authenticated() {
        return "Not signed in".to_owned();
    }
    app.auth.logout().await;
    "Signed out".to_owned()
}

/// `shopfront auth whoami`
#[must_use]
pub fn whoami(app: &Storefront) -> String {
    match app.auth.user() {
        Some(user) if app.auth.is_authenticated() => {
            with_session_note(app, format!("{} <{}> (#{})", user.name, user.email, user.id))
        }
        _ => "Not signed in".to_owned(),
    }
}

fn with_session_note(app: &Storefront, text: String) -> String {
    if app.auth.is_offline_session() {
        format!("{text}\n(offline demo session: the backend could not be reached)")
    } else {
        text
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_storefront::forms::FormError;

    use super::*;
    use crate::commands::tests::offline;

    #[tokio::test]
    async fn test_offline_login_is_announced() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = offline(dir.path()).await;

        let output = login(&mut app, "demo@example.com".into(), "password123".into())
            .await
            .unwrap();
        assert!(output.starts_with("Welcome back, Demo User!"));
        assert!(output.contains("offline demo session"));
        assert!(whoami(&app).starts_with("Demo User <demo@example.com>"));

        assert_eq!(logout(&mut app).await, "Signed out");
        assert_eq!(whoami(&app), "Not signed in");
    }

    #[tokio::test]
    async fn test_session_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut app = offline(dir.path()).await;
            login(&mut app, "demo@example.com".into(), "password123".into())
                .await
                .unwrap();
        }

        let app = offline(dir.path()).await;
        assert!(app.auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_form_errors_stop_before_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = offline(dir.path()).await;

        let err = login(&mut app, String::new(), "x".into()).await.unwrap_err();
        assert!(matches!(err, CommandError::Form(FormError::MissingFields)));

        let form = RegistrationForm {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password: "engine1".into(),
            confirm_password: "engine2".into(),
        };
        let err = register(&mut app, &form).await.unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match. Please try again.");
        assert!(!app.auth.is_authenticated());
    }
}

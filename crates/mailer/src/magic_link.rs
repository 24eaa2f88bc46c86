//! Sign-in link email, localized.
//!
//! Content exists for en/es/fr/de; the remaining shipped locales fall back
//! to English until someone translates them.

use billfold_core::Locale;

use crate::message::OutboundEmail;

fn subject(locale: Locale) -> &'static str {
    match locale {
        Locale::Es => "Tu Enlace de Inicio de Sesión para Billfold",
        Locale::Fr => "Votre Lien de Connexion pour Billfold",
        Locale::De => "Ihr Anmeldelink für Billfold",
        _ => "Your Sign-In Link for Billfold",
    }
}

fn text(locale: Locale, url: &str) -> String {
    match locale {
        Locale::Es => format!(
            "Hola,\n\nHaz clic en el enlace de abajo para iniciar sesión en tu cuenta:\n\n{url}\n\n\
             Este enlace caducará en 30 minutos.\n\nSi no has solicitado este correo, por favor ignóralo.\n\n\
             Gracias,\nEl Equipo de Billfold"
        ),
        Locale::Fr => format!(
            "Bonjour,\n\nCliquez sur le lien ci-dessous pour vous connecter à votre compte:\n\n{url}\n\n\
             Ce lien expirera dans 30 minutes.\n\nSi vous n'avez pas demandé cet e-mail, veuillez l'ignorer.\n\n\
             Cordialement,\nL'équipe Billfold"
        ),
        Locale::De => format!(
            "Hallo,\n\nKlicken Sie auf den untenstehenden Link, um sich in Ihrem Konto anzumelden:\n\n{url}\n\n\
             Dieser Link läuft in 30 Minuten ab.\n\nWenn Sie diese E-Mail nicht angefordert haben, ignorieren Sie sie bitte.\n\n\
             Danke,\nDas Billfold-Team"
        ),
        _ => format!(
            "Hello,\n\nClick the link below to sign in to your account:\n\n{url}\n\n\
             This link will expire in 30 minutes.\n\nIf you did not request this email, please ignore it.\n\n\
             Thanks,\nThe Billfold Team"
        ),
    }
}

fn html(locale: Locale, url: &str) -> String {
    let (heading, intro, button, expiry, ignore, signoff) = match locale {
        Locale::Es => (
            "Inicia sesión en Billfold",
            "Haz clic en el botón de abajo para iniciar sesión en tu cuenta:",
            "Iniciar Sesión",
            "Este enlace caducará en 30 minutos.",
            "Si no has solicitado este correo, por favor ignóralo.",
            "Gracias,<br>El Equipo de Billfold",
        ),
        Locale::Fr => (
            "Connectez-vous à Billfold",
            "Cliquez sur le bouton ci-dessous pour vous connecter à votre compte:",
            "Se Connecter",
            "Ce lien expirera dans 30 minutes.",
            "Si vous n'avez pas demandé cet e-mail, veuillez l'ignorer.",
            "Cordialement,<br>L'équipe Billfold",
        ),
        Locale::De => (
            "Melden Sie sich bei Billfold an",
            "Klicken Sie auf die Schaltfläche unten, um sich in Ihrem Konto anzumelden:",
            "Anmelden",
            "Dieser Link läuft in 30 Minuten ab.",
            "Wenn Sie diese E-Mail nicht angefordert haben, ignorieren Sie sie bitte.",
            "Danke,<br>Das Billfold-Team",
        ),
        _ => (
            "Sign in to Billfold",
            "Click the button below to sign in to your account:",
            "Sign In",
            "This link will expire in 30 minutes.",
            "If you did not request this email, please ignore it.",
            "Thanks,<br>The Billfold Team",
        ),
    };

    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333;">{heading}</h2>
  <p>{intro}</p>
  <div style="text-align: center; margin: 30px 0;">
    <a href="{url}" style="background-color: #0070f3; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; display: inline-block;">{button}</a>
  </div>
  <p style="color: #666; font-size: 14px;">{expiry}</p>
  <p style="color: #666; font-size: 14px;">{ignore}</p>
  <p>{signoff}</p>
</div>"#
    )
}

/// Build the sign-in email for `to`, pointing at `url`.
pub fn magic_link_email(to: &str, url: &str, locale: Locale) -> OutboundEmail {
    OutboundEmail::new(to, subject(locale), text(locale, url)).with_html(html(locale, url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_and_expiry_are_present_in_both_bodies() {
        let email = magic_link_email("a@b.co", "https://app.test/en/verify?token=x", Locale::En);
        assert!(email.text.contains("https://app.test/en/verify?token=x"));
        assert!(email.text.contains("30 minutes"));
        let html = email.html.unwrap();
        assert!(html.contains("https://app.test/en/verify?token=x"));
    }

    #[test]
    fn unlocalized_languages_fall_back_to_english() {
        let email = magic_link_email("a@b.co", "https://x", Locale::Pl);
        assert!(email.subject.contains("Sign-In Link"));
    }

    #[test]
    fn german_content_is_german() {
        let email = magic_link_email("a@b.co", "https://x", Locale::De);
        assert!(email.subject.contains("Anmeldelink"));
        assert!(email.text.contains("30 Minuten"));
    }
}

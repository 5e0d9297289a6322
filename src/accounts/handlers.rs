use axum::{extract::State, Json};
use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    accounts::{
        codes::{CodeCheck, IssuedCode},
        dto::{
            EmailRequest, LoginRequest, MessageResponse, ResetPasswordRequest, SignupRequest,
            SignupResponse, VerifyRequest,
        },
        password::{hash_password, verify_password},
        repo_types::User,
    },
    error::AppError,
    mailer,
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, AppError> {
    if payload.fullname.is_empty() || payload.email.is_empty() || payload.password.is_empty() {
        warn!("signup missing fields");
        return Err(AppError::Validation("All fields required".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::EmailTaken);
    }

    let hash = hash_password(&payload.password).map_err(AppError::Internal)?;
    let issued = IssuedCode::issue();

    // Insert before sending mail. If the send fails the row stays; /resend
    // is the recovery path for a user who never received their code.
    let user = User::create(&state.db, &payload.fullname, &payload.email, &hash, &issued).await?;

    let (subject, body) = mailer::verification_email(&user.fullname, &issued.code);
    state
        .mailer
        .send(&user.email, &subject, &body)
        .await
        .map_err(AppError::Mail)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(SignupResponse {
        message: "User registered. Verification code sent.".into(),
        email: user.email,
    }))
}

#[instrument(skip(state, payload))]
pub async fn verify(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(AppError::NotFound)?;

    if user.verified {
        warn!(email = %user.email, "already verified");
        return Err(AppError::AlreadyVerified);
    }

    match user
        .verification_slot()
        .check(&payload.code, OffsetDateTime::now_utc())
    {
        CodeCheck::Valid => {}
        CodeCheck::Expired => return Err(AppError::CodeExpired),
        CodeCheck::Mismatch | CodeCheck::NoCode => return Err(AppError::InvalidCode),
    }

    User::mark_verified(&state.db, &user.email).await?;

    info!(user_id = %user.id, email = %user.email, "email verified");
    Ok(Json(MessageResponse {
        message: "Email verified successfully!".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        warn!("login missing fields");
        return Err(AppError::Validation("All fields required".into()));
    }

    // Unknown email and wrong password both answer InvalidCredentials so the
    // response shape never reveals whether the email is registered.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!("login unknown email");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !user.verified {
        warn!(user_id = %user.id, "login before verification");
        return Err(AppError::Unverified);
    }

    let ok = verify_password(&payload.password, &user.password_hash)
        .map_err(AppError::Internal)?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(MessageResponse {
        message: format!("Welcome back, {}!", user.fullname),
    }))
}

#[instrument(skip(state, payload))]
pub async fn resend(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(AppError::NotFound)?;

    if user.verified {
        warn!(email = %user.email, "resend for verified user");
        return Err(AppError::AlreadyVerified);
    }

    // The fresh code overwrites the old pair, invalidating the old code even
    // if the mail below never arrives; the caller retries /resend.
    let issued = IssuedCode::issue();
    User::set_verification_code(&state.db, &user.email, &issued).await?;

    let (subject, body) = mailer::resend_email(&issued.code);
    state
        .mailer
        .send(&user.email, &subject, &body)
        .await
        .map_err(AppError::Mail)?;

    info!(user_id = %user.id, email = %user.email, "verification code resent");
    Ok(Json(MessageResponse {
        message: "New verification code sent.".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if payload.email.is_empty() {
        return Err(AppError::Validation("Email required".into()));
    }

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(AppError::NotFound)?;

    let issued = IssuedCode::issue();
    User::set_reset_code(&state.db, &user.email, &issued).await?;

    let (subject, body) = mailer::reset_email(&user.fullname, &issued.code);
    state
        .mailer
        .send(&user.email, &subject, &body)
        .await
        .map_err(AppError::Mail)?;

    info!(user_id = %user.id, email = %user.email, "reset code sent");
    Ok(Json(MessageResponse {
        message: "Reset code sent successfully!".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn verify_reset_code(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if payload.email.is_empty() || payload.code.is_empty() {
        return Err(AppError::Validation("Email and code required".into()));
    }

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(AppError::NotFound)?;

    check_reset_slot(&user, &payload.code)?;

    // Deliberately side-effect free: the same code is checked again by
    // /reset-password, so a two-step UI can pre-validate it.
    Ok(Json(MessageResponse {
        message: "Code verified successfully.".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if payload.email.is_empty() || payload.code.is_empty() || payload.new_password.is_empty() {
        return Err(AppError::Validation("All fields required".into()));
    }

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(AppError::NotFound)?;

    // Same checks as /verify-reset-code: this endpoint must stand on its own
    // against requests that skipped the pre-validation step.
    check_reset_slot(&user, &payload.code)?;

    let hash = hash_password(&payload.new_password).map_err(AppError::Internal)?;
    User::reset_password(&state.db, &user.email, &hash).await?;

    info!(user_id = %user.id, email = %user.email, "password reset");
    Ok(Json(MessageResponse {
        message: "Password reset successfully!".into(),
    }))
}

fn check_reset_slot(user: &User, submitted: &str) -> Result<(), AppError> {
    match user.reset_slot().check(submitted, OffsetDateTime::now_utc()) {
        CodeCheck::Valid => Ok(()),
        CodeCheck::NoCode => Err(AppError::NoResetRequest),
        CodeCheck::Expired => Err(AppError::CodeExpired),
        CodeCheck::Mismatch => Err(AppError::InvalidCode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::codes::{CodeSlot, CODE_TTL};
    use time::Duration;
    use uuid::Uuid;

    fn user_with_reset_slot(slot: CodeSlot) -> User {
        let (reset_code, reset_expires) = match slot {
            CodeSlot::Empty => (None, None),
            CodeSlot::Pending { code, expires_at } => (Some(code), Some(expires_at)),
        };
        User {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            fullname: "Ann".into(),
            password_hash: "$argon2id$fake".into(),
            verified: true,
            verification_code: None,
            verification_expires: None,
            reset_code,
            reset_expires,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@x.com"));
    }

    #[test]
    fn reset_checks_run_in_order() {
        let user = user_with_reset_slot(CodeSlot::Empty);
        assert!(matches!(
            check_reset_slot(&user, "123456"),
            Err(AppError::NoResetRequest)
        ));

        let now = OffsetDateTime::now_utc();
        let user = user_with_reset_slot(CodeSlot::Pending {
            code: "123456".into(),
            expires_at: now - Duration::seconds(1),
        });
        // Expired wins even when the code matches.
        assert!(matches!(
            check_reset_slot(&user, "123456"),
            Err(AppError::CodeExpired)
        ));

        let user = user_with_reset_slot(CodeSlot::Pending {
            code: "123456".into(),
            expires_at: now + CODE_TTL,
        });
        assert!(matches!(
            check_reset_slot(&user, "654321"),
            Err(AppError::InvalidCode)
        ));
        assert!(check_reset_slot(&user, "123456").is_ok());
    }

    #[tokio::test]
    async fn signup_rejects_missing_fields() {
        let state = AppState::fake();
        let res = signup(
            State(state),
            Json(SignupRequest {
                fullname: String::new(),
                email: "a@x.com".into(),
                password: "pw123".into(),
            }),
        )
        .await;
        assert!(matches!(res, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn signup_rejects_bad_email_shape() {
        let state = AppState::fake();
        let res = signup(
            State(state),
            Json(SignupRequest {
                fullname: "Ann".into(),
                email: "not-an-email".into(),
                password: "pw123".into(),
            }),
        )
        .await;
        assert!(matches!(res, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn login_rejects_missing_fields() {
        let state = AppState::fake();
        let res = login(
            State(state),
            Json(LoginRequest {
                email: "a@x.com".into(),
                password: String::new(),
            }),
        )
        .await;
        assert!(matches!(res, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn reset_password_rejects_missing_fields() {
        let state = AppState::fake();
        let res = reset_password(
            State(state),
            Json(ResetPasswordRequest {
                email: "a@x.com".into(),
                code: "123456".into(),
                new_password: String::new(),
            }),
        )
        .await;
        assert!(matches!(res, Err(AppError::Validation(_))));
    }
}

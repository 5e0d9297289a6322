use serde::{Deserialize, Serialize};

// Request fields default to empty strings so an absent field fails the
// handler's required-field check with a 400 rather than a deserializer
// rejection.

/// Request body for signup.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub fullname: String,
    pub email: String,
    pub password: String,
}

/// Request body for email verification and for reset-code checks.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body carrying just an email (resend, forgot-password).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmailRequest {
    pub email: String,
}

/// Request body for the final password-reset step.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

/// Generic success acknowledgment.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Signup acknowledgment echoing the registered email.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_empty() {
        let req: SignupRequest = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        assert_eq!(req.email, "a@x.com");
        assert!(req.fullname.is_empty());
        assert!(req.password.is_empty());
    }

    #[test]
    fn reset_password_uses_camel_case_wire_name() {
        let req: ResetPasswordRequest = serde_json::from_str(
            r#"{"email":"a@x.com","code":"123456","newPassword":"pw456"}"#,
        )
        .unwrap();
        assert_eq!(req.new_password, "pw456");
    }

    #[test]
    fn signup_response_echoes_email() {
        let json = serde_json::to_string(&SignupResponse {
            message: "User registered. Verification code sent.".into(),
            email: "a@x.com".into(),
        })
        .unwrap();
        assert!(json.contains("a@x.com"));
        assert!(json.contains("message"));
    }
}

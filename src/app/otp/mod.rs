pub mod password_reset_otp;

/// Code generation only, storing and delivering is up to the caller
pub trait OtpManager {
    fn generate_otp(&self) -> String;
}

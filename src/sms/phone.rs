use std::fmt;
use std::str::FromStr;

const MIN_DIGITS: usize = 3;
const MAX_DIGITS: usize = 15;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumberError {
    #[error("Phone number is empty!")]
    Empty,
    #[error("Phone number contains invalid character '{0}'")]
    InvalidCharacter(char),
    #[error("Phone number must have between 3 and 15 digits, got {0}")]
    InvalidLength(usize),
}

/// A validated phone number, either `+` prefixed international format or bare digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);
impl PhoneNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_international(&self) -> bool {
        self.0.starts_with('+')
    }

    /// Hides the middle digits so numbers can be logged, eg: +155***4567
    /// At most a third of the number is shown on either side.
    pub fn masked(&self) -> String {
        let len = self.0.len();
        let shown = len / 3;
        let head = shown.min(5);
        let tail = shown.min(4);
        format!("{}***{}", &self.0[..head], &self.0[len - tail..])
    }
}
impl FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PhoneNumberError::Empty);
        }

        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if let Some(invalid) = digits.chars().find(|c| !c.is_ascii_digit()) {
            return Err(PhoneNumberError::InvalidCharacter(invalid));
        }
        if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
            return Err(PhoneNumberError::InvalidLength(digits.len()));
        }

        Ok(Self(trimmed.to_string()))
    }
}
impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//! Local checks applied before a request is built.

use url::Url;

use crate::catalog::Operation;
use crate::error::ValidationError;

/// Longest destination the service accepts, in characters.
pub const MAX_DESTINATION_LENGTH: usize = 1000;

/// Base against which relative destinations (`#anchor`, `/path`) are resolved.
const REFERENCE_BASE: &str = "https://destination.invalid/";

/// Check a link destination.
///
/// Any URL reference is accepted, relative ones included, as long as it
/// parses: percent signs must start a two-digit hex escape, control
/// characters are not allowed, and an authority, if present, must be valid.
pub fn validate_destination(destination: &str) -> Result<(), ValidationError> {
    if destination.is_empty() {
        return Err(ValidationError::EmptyDestination);
    }

    let length = destination.chars().count();
    if length > MAX_DESTINATION_LENGTH {
        return Err(ValidationError::DestinationTooLong {
            length,
            max: MAX_DESTINATION_LENGTH,
        });
    }

    check_escapes(destination)?;

    if let Some(c) = destination.chars().find(char::is_ascii_control) {
        return Err(ValidationError::InvalidDestination(format!(
            "control character {c:?}"
        )));
    }

    match Url::parse(destination) {
        Ok(_) => Ok(()),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(REFERENCE_BASE)
            .and_then(|base| base.join(destination))
            .map(|_| ())
            .map_err(|e| ValidationError::InvalidDestination(e.to_string())),
        Err(e) => Err(ValidationError::InvalidDestination(e.to_string())),
    }
}

/// Path identifiers must be non-empty and must not be a dot segment.
///
/// URL path normalisation removes `.` and `..`, which would turn the request
/// into a different operation on the parent collection.
pub fn validate_identifier(operation: Operation, id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::EmptyIdentifier { operation });
    }
    if matches!(id, "." | "..") {
        return Err(ValidationError::InvalidIdentifier {
            operation,
            id: id.to_string(),
        });
    }
    Ok(())
}

fn check_escapes(input: &str) -> Result<(), ValidationError> {
    let bytes = input.as_bytes();
    for (i, _) in input.match_indices('%') {
        let escape = bytes.get(i + 1..i + 3);
        let valid = escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            let end = input.len().min(i + 3);
            let shown = input.get(i..end).unwrap_or("%");
            return Err(ValidationError::InvalidDestination(format!(
                "invalid escape {shown:?}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_destination() {
        assert_eq!(validate_destination(""), Err(ValidationError::EmptyDestination));
    }

    #[test]
    fn destination_at_limit_is_accepted() {
        let dest = format!("https://example.com/{}", "a".repeat(MAX_DESTINATION_LENGTH - 20));
        assert_eq!(dest.chars().count(), MAX_DESTINATION_LENGTH);
        assert_eq!(validate_destination(&dest), Ok(()));
    }

    #[test]
    fn destination_over_limit() {
        let dest = "0".repeat(MAX_DESTINATION_LENGTH + 1);
        assert_eq!(
            validate_destination(&dest),
            Err(ValidationError::DestinationTooLong {
                length: MAX_DESTINATION_LENGTH + 1,
                max: MAX_DESTINATION_LENGTH,
            })
        );
    }

    #[test]
    fn length_counts_characters() {
        let dest = format!("https://example.com/{}", "é".repeat(900));
        assert!(dest.len() > MAX_DESTINATION_LENGTH);
        assert_eq!(validate_destination(&dest), Ok(()));
    }

    #[test]
    fn malformed_escape_is_rejected() {
        assert!(matches!(
            validate_destination("%!"),
            Err(ValidationError::InvalidDestination(_))
        ));
        assert!(matches!(
            validate_destination("https://example.com/100%"),
            Err(ValidationError::InvalidDestination(_))
        ));
    }

    #[test]
    fn bad_authority_is_rejected() {
        assert!(matches!(
            validate_destination("http://[::1"),
            Err(ValidationError::InvalidDestination(_))
        ));
        assert!(matches!(
            validate_destination("https://exa mple.com"),
            Err(ValidationError::InvalidDestination(_))
        ));
    }

    #[test]
    fn special_scheme_without_host_is_rejected() {
        for dest in ["http://", "https://"] {
            assert!(
                matches!(
                    validate_destination(dest),
                    Err(ValidationError::InvalidDestination(_))
                ),
                "{dest}"
            );
        }
    }

    #[test]
    fn control_characters_are_rejected() {
        assert!(matches!(
            validate_destination("https://example.com/\u{7f}"),
            Err(ValidationError::InvalidDestination(_))
        ));
    }

    #[test]
    fn references_are_accepted() {
        for dest in [
            "#anchor",
            "/relative/path?q=1",
            "https://example.com",
            "https://example.com/a%20b",
            "mailto:someone@example.com",
        ] {
            assert_eq!(validate_destination(dest), Ok(()), "{dest}");
        }
    }

    #[test]
    fn empty_identifier() {
        assert_eq!(
            validate_identifier(Operation::LinkDetails, ""),
            Err(ValidationError::EmptyIdentifier {
                operation: Operation::LinkDetails
            })
        );
        assert_eq!(validate_identifier(Operation::LinkDetails, "abc"), Ok(()));
    }

    #[test]
    fn dot_segment_identifiers_are_rejected() {
        for id in [".", ".."] {
            assert_eq!(
                validate_identifier(Operation::UpdateLink, id),
                Err(ValidationError::InvalidIdentifier {
                    operation: Operation::UpdateLink,
                    id: id.to_string(),
                })
            );
        }
        assert_eq!(validate_identifier(Operation::UpdateLink, "..."), Ok(()));
        assert_eq!(validate_identifier(Operation::UpdateLink, "a.b"), Ok(()));
    }
}

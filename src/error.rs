use thiserror::Error;

/// Failure to obtain the photo list for a variant.
#[derive(Debug, Error)]
pub enum PhotoFetchError {
    /// The request never produced a response.
    #[error("photo request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The listing endpoint answered with a non-success status.
    #[error("photo listing returned {status}: {message}")]
    Status { status: u16, message: String },

    /// A success response whose body was not a photo listing.
    #[error("photo listing is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A carousel could not be attached to its render surface.
#[derive(Debug, Error)]
pub enum MountError {
    /// The host has no container for the requested layout.
    #[error("carousel container `{0}` is missing")]
    MissingContainer(&'static str),

    /// Nothing to show; the section stays hidden.
    #[error("no photos to display")]
    Empty,
}

/// User-facing contact form failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// The hidden access key is missing, so the form was never sent.
    #[error("{0}")]
    Validation(String),

    /// The request did not complete.
    #[error("{0}")]
    Network(String),

    /// The form service answered with anything but `200` or an unreadable body.
    #[error("{message}")]
    Remote { status: u16, message: String },
}

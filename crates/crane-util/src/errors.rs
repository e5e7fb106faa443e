use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all Crane operations.
///
/// Every resolution failure is terminal for the pass that raised it: the
/// resolver never returns a partial graph alongside one of these.
#[derive(Debug, Error, Diagnostic)]
pub enum CraneError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed consumer manifest (e.g. Crane.toml) or recipe file.
    #[error("Manifest error: {message}")]
    #[diagnostic(help("Check the file for TOML syntax errors"))]
    Manifest { message: String },

    /// A reference string does not match `name/version[@user/channel]`.
    #[error("Invalid reference '{reference}': {reason}")]
    #[diagnostic(help("References look like name/version@user/channel"))]
    MalformedReference { reference: String, reason: String },

    /// An alias was defined to a package with a different name.
    #[error("An alias can only be defined to a package with the same name: '{alias}' -> '{target}'")]
    NameMismatch { alias: String, target: String },

    /// An alias would shadow a real package in the store.
    #[error("Reference '{reference}' is already a package")]
    #[diagnostic(help("Remove the package first if the alias should replace it"))]
    AlreadyExistsAsPackage { reference: String },

    /// An alias definition is structurally invalid (e.g. uses a version range).
    #[error("Invalid alias: {message}")]
    InvalidAlias { message: String },

    /// Following alias entries revisited a reference.
    #[error("Alias cycle detected: {chain}")]
    AliasCycle { chain: String },

    /// A requirement chain loops back onto a package on the current path.
    #[error("Dependency cycle detected: {cycle}")]
    DependencyCycle { cycle: String },

    /// Two requests for the same package resolved to different references.
    #[error("Version conflict for '{name}': {consumer} requires {requested}, but {selected} was already selected")]
    #[diagnostic(help("Pin the version in the consumer manifest or use the nearest-wins policy"))]
    VersionConflict {
        name: String,
        consumer: String,
        requested: String,
        selected: String,
    },

    /// No available version satisfies a range expression.
    #[error("No version of '{reference}' satisfies the range")]
    UnresolvableRange { reference: String },

    /// The recipe provider has no recipe for a reference.
    #[error("Recipe not found: {reference}")]
    RecipeNotFound { reference: String },

    /// A recipe could not be evaluated (bad requirement, unknown option, ...).
    #[error("Error evaluating recipe {reference}: {message}")]
    RecipeEvaluation { reference: String, message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Result alias used throughout the library crates.
pub type CraneResult<T> = Result<T, CraneError>;

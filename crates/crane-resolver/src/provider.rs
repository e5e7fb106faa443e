//! The seams between the resolver and whatever stores recipes.

use crane_core::recipe::{Recipe, RequirementKind};
use crane_core::reference::Reference;
use crane_util::errors::CraneResult;

/// Source of recipes and of the versions that exist.
///
/// Implementations decide how requirements are computed (a static
/// `recipe.toml`, an evaluator, a remote index); the resolver only sees the
/// declared lists.
pub trait RecipeProvider {
    /// Every stored reference for `name`, in any user/channel.
    fn available_versions(&self, name: &str) -> CraneResult<Vec<Reference>>;

    /// The recipe for a concrete reference, or `RecipeNotFound`.
    fn recipe(&self, reference: &Reference) -> CraneResult<Recipe>;

    /// Declared requirements of one phase, in declaration order.
    fn requirements(
        &self,
        reference: &Reference,
        kind: RequirementKind,
    ) -> CraneResult<Vec<Reference>> {
        self.recipe(reference)?.requirements(kind)
    }
}

/// Answers whether a reference names a real (non-alias) package.
pub trait PackageIndex {
    fn contains_package(&self, reference: &Reference) -> bool;
}

impl<T: RecipeProvider + ?Sized> RecipeProvider for &T {
    fn available_versions(&self, name: &str) -> CraneResult<Vec<Reference>> {
        (**self).available_versions(name)
    }

    fn recipe(&self, reference: &Reference) -> CraneResult<Recipe> {
        (**self).recipe(reference)
    }

    fn requirements(
        &self,
        reference: &Reference,
        kind: RequirementKind,
    ) -> CraneResult<Vec<Reference>> {
        (**self).requirements(reference, kind)
    }
}

impl<T: PackageIndex + ?Sized> PackageIndex for &T {
    fn contains_package(&self, reference: &Reference) -> bool {
        (**self).contains_package(reference)
    }
}

//! Drift detection between live and latest versions.

use crate::dependency::Dependency;

/// Returns true when the deployment is behind upstream.
///
/// Versions are opaque: exact, case-sensitive string comparison with no
/// normalization or ordering.
#[must_use]
pub fn needs_action(dependency: &Dependency) -> bool {
    dependency.live != dependency.latest
}

/// Dependencies that need a bump, in their original order.
#[must_use]
pub fn drifting(dependencies: &[Dependency]) -> Vec<&Dependency> {
    dependencies.iter().filter(|d| needs_action(d)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::DependencyId;

    #[test]
    fn equal_versions_need_nothing() {
        let dependency = Dependency::new(DependencyId::Binderhub, "0.2.1", "0.2.1");
        assert!(!needs_action(&dependency));
    }

    #[test]
    fn different_versions_drift() {
        let dependency = Dependency::new(DependencyId::Repo2docker, "abc1234", "def5678");
        assert!(needs_action(&dependency));
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let dependency = Dependency::new(DependencyId::Repo2docker, "abc1234", "ABC1234");
        assert!(needs_action(&dependency));
    }

    #[test]
    fn drifting_keeps_order() {
        let dependencies = [
            Dependency::new(DependencyId::Repo2docker, "a", "b"),
            Dependency::new(DependencyId::Binderhub, "0.2.1", "0.2.1"),
        ];
        let drifted = drifting(&dependencies);

        assert_eq!(drifted.len(), 1);
        assert_eq!(drifted[0].id, DependencyId::Repo2docker);
    }
}

use std::collections::BTreeSet;

use crane_core::recipe::Recipe;
use crane_core::reference::Reference;
use crane_resolver::alias::AliasStore;
use crane_resolver::catalog::MemoryCatalog;
use crane_resolver::events::ResolutionStatus;
use crane_resolver::export;
use crane_resolver::resolver::{Resolution, Resolver, RootRequest};
use crane_util::errors::CraneError;

fn r(s: &str) -> Reference {
    Reference::parse(s).unwrap()
}

struct Fixture {
    catalog: MemoryCatalog,
    aliases: AliasStore,
}

impl Fixture {
    fn new() -> Self {
        Self {
            catalog: MemoryCatalog::new(),
            aliases: AliasStore::new(),
        }
    }

    fn export(&mut self, reference: &str, recipe: Recipe) {
        self.catalog.export(reference, recipe).unwrap();
    }

    fn alias(&self, source: &str, target: &str) {
        self.aliases.define(r(source), r(target), &self.catalog).unwrap();
    }

    /// Export `name/0.1@user/testing` and alias `name/ALIAS@user/testing` to it.
    fn export_aliased(&mut self, name: &str, recipe: Recipe) {
        self.export(&format!("{name}/0.1@user/testing"), recipe);
        self.alias(
            &format!("{name}/ALIAS@user/testing"),
            &format!("{name}/0.1@user/testing"),
        );
    }

    fn resolve(&self, root: &RootRequest) -> Resolution {
        Resolver::new(&self.catalog, &self.aliases).resolve(root).unwrap()
    }
}

fn root(display: &str, requires: &[&str]) -> RootRequest {
    requires
        .iter()
        .fold(RootRequest::new(display), |acc, req| acc.with_require(r(req)))
}

fn edge_set(resolution: &Resolution) -> BTreeSet<(String, String)> {
    export::edges(&resolution.graph).into_iter().collect()
}

fn edge(from: &str, to: &str) -> (String, String) {
    (from.to_string(), to.to_string())
}

fn requiring(reqs: &[&str]) -> Recipe {
    reqs.iter().fold(Recipe::new(), |acc, req| acc.with_require(req))
}

#[test]
fn alias_chain_resolves_to_terminal() {
    let mut f = Fixture::new();
    f.export("Pkg/0.1@user/testing", Recipe::new());
    f.alias("Pkg/latest@user/testing", "Pkg/0.1@user/testing");
    f.alias("Pkg/superlatest@user/testing", "Pkg/latest@user/testing");
    f.alias("Pkg/megalatest@user/testing", "Pkg/superlatest@user/testing");

    let terminal = r("Pkg/0.1@user/testing");
    assert_eq!(f.aliases.resolve(&r("Pkg/megalatest@user/testing")).unwrap(), terminal);
    assert_eq!(f.aliases.resolve(&r("Pkg/superlatest@user/testing")).unwrap(), terminal);

    let resolution = f.resolve(&root("Crane.toml", &["Pkg/megalatest@user/testing"]));
    let dot = export::to_dot(&resolution.graph);
    assert!(dot.contains("\"Crane.toml\" -> \"Pkg/0.1@user/testing\""));
    assert!(!dot.contains("latest@user"));
    for event in &resolution.events {
        assert!(!event.to_string().contains("latest@user"));
    }
}

#[test]
fn redefined_alias_resolves_to_latest_target() {
    let mut f = Fixture::new();
    for v in ["0.1", "0.2", "0.3"] {
        f.export(&format!("Hello/{v}@lasote/channel"), Recipe::new());
    }
    f.alias("Hello/0.X@lasote/channel", "Hello/0.1@lasote/channel");
    f.alias("Hello/0.X@lasote/channel", "Hello/0.2@lasote/channel");
    f.alias("Hello/0.X@lasote/channel", "Hello/0.3@lasote/channel");

    f.export("Chat/1.0@lasote/channel", requiring(&["Hello/0.X@lasote/channel"]));
    let resolution = f.resolve(&root("Crane.toml", &["Chat/1.0@lasote/channel"]));
    let packages: Vec<String> = resolution
        .graph
        .packages()
        .iter()
        .map(|p| p.to_string())
        .collect();
    assert_eq!(packages, ["Chat/1.0@lasote/channel", "Hello/0.3@lasote/channel"]);
}

#[test]
fn alias_cannot_shadow_real_package_until_removed() {
    let mut f = Fixture::new();
    f.export("PkgA/0.1@user/testing", Recipe::new().with_description("PkgA/0.1@user/testing"));
    f.export("PkgA/0.2@user/testing", Recipe::new().with_description("PkgA/0.2@user/testing"));

    let alias = r("PkgA/0.2@user/testing");
    let target = r("PkgA/0.1@user/testing");
    let err = f
        .aliases
        .define(alias.clone(), target.clone(), &f.catalog)
        .unwrap_err();
    assert_eq!(err.to_string(), "Reference 'PkgA/0.2@user/testing' is already a package");
    assert_eq!(
        f.catalog.get(&alias).unwrap().description.as_deref(),
        Some("PkgA/0.2@user/testing")
    );

    f.catalog.remove(&alias);
    f.aliases.define(alias.clone(), target.clone(), &f.catalog).unwrap();
    f.aliases.define(alias.clone(), target.clone(), &f.catalog).unwrap();
    assert_eq!(f.aliases.resolve(&alias).unwrap(), target);
}

#[test]
fn alias_to_different_name_fails() {
    let f = Fixture::new();
    let err = f
        .aliases
        .define(r("myalias/1.0@user/channel"), r("lib/1.0@user/channel"), &f.catalog)
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("An alias can only be defined to a package with the same name"));
}

#[test]
fn mutual_aliases_fail_the_pass() {
    let mut f = Fixture::new();
    f.alias("Pkg/a1@user/testing", "Pkg/b1@user/testing");
    f.alias("Pkg/b1@user/testing", "Pkg/a1@user/testing");
    f.export("Consumer/0.1@user/testing", requiring(&["Pkg/a1@user/testing"]));

    let err = Resolver::new(&f.catalog, &f.aliases)
        .resolve(&root("Crane.toml", &["Consumer/0.1@user/testing"]))
        .unwrap_err();
    assert!(matches!(err, CraneError::AliasCycle { .. }));
}

#[test]
fn double_alias_diamond() {
    let mut f = Fixture::new();
    f.export("LibD/0.1@user/testing", Recipe::new());
    f.alias("LibD/latest@user/testing", "LibD/0.1@user/testing");
    f.export("LibC/0.1@user/testing", requiring(&["LibD/latest@user/testing"]));
    f.alias("LibC/latest@user/testing", "LibC/0.1@user/testing");
    f.export("LibB/0.1@user/testing", requiring(&["LibC/latest@user/testing"]));
    f.alias("LibB/latest@user/testing", "LibB/0.1@user/testing");
    f.export("LibA/0.1@user/testing", requiring(&["LibC/latest@user/testing"]));
    f.alias("LibA/latest@user/testing", "LibA/0.1@user/testing");

    let resolution = f.resolve(&root(
        "conanfile.txt",
        &["LibA/latest@user/testing", "LibB/latest@user/testing"],
    ));
    let edges = edge_set(&resolution);
    for expected in [
        edge("LibA/0.1@user/testing", "LibC/0.1@user/testing"),
        edge("LibB/0.1@user/testing", "LibC/0.1@user/testing"),
        edge("LibC/0.1@user/testing", "LibD/0.1@user/testing"),
        edge("conanfile.txt", "LibB/0.1@user/testing"),
        edge("conanfile.txt", "LibA/0.1@user/testing"),
    ] {
        assert!(edges.contains(&expected), "missing edge {expected:?}");
    }
    assert_eq!(edges.len(), 5);

    let libc = resolution.graph.find(&r("LibC/0.1@user/testing")).unwrap();
    let parents: Vec<String> = resolution
        .graph
        .dependents_of(libc)
        .iter()
        .map(|(idx, _)| resolution.graph.node(*idx).to_string())
        .collect();
    assert_eq!(parents, ["LibA/0.1@user/testing", "LibB/0.1@user/testing"]);
    assert_eq!(resolution.graph.len(), 4);
}

#[test]
fn double_alias_ranges() {
    let mut f = Fixture::new();
    f.export("LibD/sha1@user/testing", Recipe::new());
    f.alias("LibD/0.1@user/testing", "LibD/sha1@user/testing");
    f.export("LibC/sha1@user/testing", requiring(&["LibD/[~0.1]@user/testing"]));
    f.alias("LibC/0.1@user/testing", "LibC/sha1@user/testing");
    f.export("LibB/sha1@user/testing", requiring(&["LibC/[~0.1]@user/testing"]));
    f.alias("LibB/0.1@user/testing", "LibB/sha1@user/testing");
    f.export("LibA/sha1@user/testing", requiring(&["LibC/[~0.1]@user/testing"]));
    f.alias("LibA/0.1@user/testing", "LibA/sha1@user/testing");

    let resolution = f.resolve(&root(
        "conanfile.txt",
        &["LibA/[~0.1]@user/testing", "LibB/[~0.1]@user/testing"],
    ));
    let edges = edge_set(&resolution);
    assert_eq!(
        edges,
        BTreeSet::from([
            edge("LibA/sha1@user/testing", "LibC/sha1@user/testing"),
            edge("LibB/sha1@user/testing", "LibC/sha1@user/testing"),
            edge("LibC/sha1@user/testing", "LibD/sha1@user/testing"),
            edge("conanfile.txt", "LibB/sha1@user/testing"),
            edge("conanfile.txt", "LibA/sha1@user/testing"),
        ])
    );
}

#[test]
fn double_alias_options() {
    let mut f = Fixture::new();
    let flagged = || Recipe::new().with_option("myoption", &["True", "False"], "True");
    f.export("LibD/0.1@user/testing", flagged());
    f.alias("LibD/latest@user/testing", "LibD/0.1@user/testing");
    f.export("LibC/0.1@user/testing", flagged().with_require("LibD/latest@user/testing"));
    f.alias("LibC/latest@user/testing", "LibC/0.1@user/testing");
    f.export(
        "LibB/0.1@user/testing",
        flagged()
            .with_require("LibC/latest@user/testing")
            .with_downstream_option("LibD", "myoption", "False"),
    );
    f.alias("LibB/latest@user/testing", "LibB/0.1@user/testing");
    f.export("LibA/0.1@user/testing", flagged().with_require("LibC/latest@user/testing"));
    f.alias("LibA/latest@user/testing", "LibA/0.1@user/testing");

    let resolution = f.resolve(&root(
        "conanfile.txt",
        &["LibA/latest@user/testing", "LibB/latest@user/testing"],
    ));
    let option = |reference: &str| resolution.options_of(&r(reference)).unwrap()["myoption"].clone();
    assert_eq!(option("LibD/0.1@user/testing"), "False");
    assert_eq!(option("LibC/0.1@user/testing"), "True");
    assert_eq!(option("LibB/0.1@user/testing"), "True");
    assert_eq!(option("LibA/0.1@user/testing"), "True");
    assert!(resolution.overrides.is_empty());
}

#[test]
fn alias_required_twice_is_not_an_override() {
    let mut f = Fixture::new();
    f.export("PkgA/0.1@user/testing", Recipe::new());
    f.alias("PkgA/latest@user/testing", "PkgA/0.1@user/testing");
    f.export("PkgB/0.1@user/testing", requiring(&["PkgA/latest@user/testing"]));
    f.alias("PkgB/latest@user/testing", "PkgB/0.1@user/testing");

    let resolution = f.resolve(&root(
        "Crane.toml",
        &["PkgA/latest@user/testing", "PkgB/latest@user/testing"],
    ));
    assert!(resolution.overrides.is_empty());
    assert!(!resolution.overrides.to_string().contains("overridden"));
}

#[test]
fn repeated_transitive_alias_is_already_installed() {
    let mut f = Fixture::new();
    f.export("Pkg/0.1@user/testing", Recipe::new());
    f.alias("Pkg/latest@user/testing", "Pkg/0.1@user/testing");
    f.export("Pkg1/0.1@user/testing", requiring(&["Pkg/latest@user/testing"]));
    f.export("Pkg2/0.1@user/testing", requiring(&["Pkg/latest@user/testing"]));

    let resolution = f.resolve(&root(
        "Crane.toml",
        &["Pkg1/0.1@user/testing", "Pkg2/0.1@user/testing"],
    ));
    let rendered: Vec<String> = resolution.events.iter().map(|e| e.to_string()).collect();
    assert!(rendered.contains(&"Pkg/0.1@user/testing: Already installed!".to_string()));
    assert!(rendered.iter().all(|line| !line.contains("Pkg/latest")));

    let statuses: Vec<(String, ResolutionStatus)> = resolution
        .events
        .iter()
        .map(|e| (e.reference.to_string(), e.status))
        .collect();
    assert_eq!(
        statuses,
        [
            ("Pkg1/0.1@user/testing".to_string(), ResolutionStatus::NewlyResolved),
            ("Pkg/0.1@user/testing".to_string(), ResolutionStatus::NewlyResolved),
            ("Pkg2/0.1@user/testing".to_string(), ResolutionStatus::NewlyResolved),
            ("Pkg/0.1@user/testing".to_string(), ResolutionStatus::AlreadyInstalled),
        ]
    );
}

#[test]
fn complete_large_aliased_graph() {
    let mut f = Fixture::new();
    let a = "CA/ALIAS@user/testing";
    let b = "CB/ALIAS@user/testing";
    let regular: Vec<(&str, Vec<&str>)> = vec![
        ("CA", vec![]),
        ("CB", vec![a]),
        ("CC", vec![a]),
        ("CD", vec![a, b]),
        ("CE", vec![a, b]),
        ("CF", vec![a, b]),
        ("CG", vec![a, "CD/ALIAS@user/testing", b]),
        ("CI", vec![a, b]),
        ("CH", vec![a, b]),
    ];
    for (name, reqs) in &regular {
        f.export_aliased(name, requiring(reqs));
    }

    let with_build_ca = |reqs: &[&str]| requiring(reqs).with_build_require(a);
    let cj = ["CB/ALIAS@user/testing"];
    let ck = [
        "CB/ALIAS@user/testing",
        "CH/ALIAS@user/testing",
        "CI/ALIAS@user/testing",
        "CF/ALIAS@user/testing",
        "CE/ALIAS@user/testing",
        "CD/ALIAS@user/testing",
        "CJ/ALIAS@user/testing",
        "CG/ALIAS@user/testing",
    ];
    let cl = [
        "CI/ALIAS@user/testing",
        "CF/ALIAS@user/testing",
        "CC/ALIAS@user/testing",
        "CJ/ALIAS@user/testing",
        "CB/ALIAS@user/testing",
        "CH/ALIAS@user/testing",
        "CK/ALIAS@user/testing",
    ];
    let cm = ["CB/ALIAS@user/testing", "CL/ALIAS@user/testing"];
    f.export_aliased("CJ", with_build_ca(&cj));
    f.export_aliased("CK", with_build_ca(&ck));
    f.export_aliased("CL", with_build_ca(&cl));
    f.export_aliased("CM", with_build_ca(&cm));

    let consumer = [
        "CD/ALIAS@user/testing",
        "CI/ALIAS@user/testing",
        "CG/ALIAS@user/testing",
        "CM/ALIAS@user/testing",
        "CJ/ALIAS@user/testing",
        "CK/ALIAS@user/testing",
        "CB/ALIAS@user/testing",
        "CL/ALIAS@user/testing",
        "CH/ALIAS@user/testing",
    ];
    let request = root("conanfile.py", &consumer).with_build_require(r(a));
    let resolution = f.resolve(&request);

    let edges = edge_set(&resolution);
    for expected in [
        edge("conanfile.py", "CD/0.1@user/testing"),
        edge("CB/0.1@user/testing", "CA/0.1@user/testing"),
        edge("CD/0.1@user/testing", "CA/0.1@user/testing"),
        edge("CD/0.1@user/testing", "CB/0.1@user/testing"),
        edge("CJ/0.1@user/testing", "CB/0.1@user/testing"),
    ] {
        assert!(edges.contains(&expected), "missing edge {expected:?}");
    }

    // alias hops add no edges: the edge set is exactly the declarations
    let concrete = |alias: &str| alias.replace("ALIAS", "0.1");
    let mut declared = BTreeSet::new();
    for (name, reqs) in &regular {
        for req in reqs {
            declared.insert(edge(&format!("{name}/0.1@user/testing"), &concrete(req)));
        }
    }
    for (name, reqs) in [("CJ", &cj[..]), ("CK", &ck[..]), ("CL", &cl[..]), ("CM", &cm[..])] {
        let parent = format!("{name}/0.1@user/testing");
        declared.insert(edge(&parent, "CA/0.1@user/testing"));
        for req in reqs {
            declared.insert(edge(&parent, &concrete(req)));
        }
    }
    declared.insert(edge("conanfile.py", "CA/0.1@user/testing"));
    for req in consumer {
        declared.insert(edge("conanfile.py", &concrete(req)));
    }
    assert_eq!(edges, declared);
    assert_eq!(resolution.graph.len(), 13);
    assert!(!export::to_dot(&resolution.graph).contains("ALIAS"));
}

#[test]
fn striped_large_aliased_graph() {
    let mut f = Fixture::new();
    f.export_aliased("CH", Recipe::new());
    f.export_aliased("CK", requiring(&["CH/ALIAS@user/testing"]));
    f.export_aliased(
        "CL",
        requiring(&["CK/ALIAS@user/testing", "CH/ALIAS@user/testing"]),
    );
    f.export_aliased("CM", requiring(&["CL/ALIAS@user/testing"]));

    let resolution = f.resolve(&root(
        "conanfile.py",
        &[
            "CM/ALIAS@user/testing",
            "CL/ALIAS@user/testing",
            "CK/ALIAS@user/testing",
            "CH/ALIAS@user/testing",
        ],
    ));
    let dot = export::to_dot(&resolution.graph);
    for line in [
        "\"CM/0.1@user/testing\" -> \"CL/0.1@user/testing\"",
        "\"CL/0.1@user/testing\" -> \"CK/0.1@user/testing\"",
        "\"CL/0.1@user/testing\" -> \"CH/0.1@user/testing\"",
        "\"CK/0.1@user/testing\" -> \"CH/0.1@user/testing\"",
    ] {
        assert!(dot.contains(line), "missing {line} in\n{dot}");
    }
    assert_eq!(resolution.graph.len(), 4);
}

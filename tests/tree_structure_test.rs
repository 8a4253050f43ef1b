use parsitree::{Tree, TreeError, parse_newick, random_binary_tree};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

struct TreeTopology {
    tip_count: usize,
    internal_count: usize,
    is_binary: bool,
    max_depth: usize,
}

fn max_depth(tree: &Tree) -> usize {
    tree.tips()
        .into_iter()
        .map(|tip| {
            let mut depth = 0;
            let mut node_id = tip;
            while let Some(parent_id) = tree.parent_id(node_id) {
                depth += 1;
                node_id = parent_id;
            }
            depth
        })
        .max()
        .unwrap_or(0)
}

#[test]
fn test_tree_topology_and_structure_validation() {
    let test_cases = vec![
        (
            "Simple bifurcating",
            "(A,B);",
            TreeTopology { tip_count: 2, internal_count: 1, is_binary: true, max_depth: 1 },
        ),
        (
            "Three-tip tree",
            "(A,B,C);",
            TreeTopology { tip_count: 3, internal_count: 1, is_binary: false, max_depth: 1 },
        ),
        (
            "Asymmetric tree",
            "(A,(B,(C,D)));",
            TreeTopology { tip_count: 4, internal_count: 3, is_binary: true, max_depth: 3 },
        ),
        (
            "Mixed binary/multifurcating",
            "((A,B,C),(D,E));",
            TreeTopology { tip_count: 5, internal_count: 3, is_binary: false, max_depth: 2 },
        ),
    ];

    for (name, newick, expected) in test_cases {
        println!("Testing topology: {name}");
        let tree = parse_newick(newick).unwrap();
        assert_eq!(tree.tip_count(), expected.tip_count, "{name}");
        assert_eq!(tree.internal_nodes().len(), expected.internal_count, "{name}");
        let is_binary = tree
            .internal_nodes()
            .into_iter()
            .all(|node_id| tree.child_ids(node_id).len() == 2);
        assert_eq!(is_binary, expected.is_binary, "{name}");
        assert_eq!(max_depth(&tree), expected.max_depth, "{name}");
    }
}

#[test]
fn test_traversals() {
    let tree = parse_newick("((A,B)x,(C,D)y)r;").unwrap();
    let names = |order: Vec<parsitree::NodeId>| -> Vec<String> {
        order
            .into_iter()
            .map(|node_id| tree.name(node_id).map_or("-".to_string(), |n| n.to_string()))
            .collect()
    };
    assert_eq!(names(tree.preorder()), ["-", "x", "A", "B", "y", "C", "D"]);
    assert_eq!(names(tree.postorder()), ["A", "B", "x", "C", "D", "y", "-"]);

    let indices: Vec<usize> = tree
        .preorder()
        .into_iter()
        .map(|node_id| tree.node(node_id).unwrap().index())
        .collect();
    assert_eq!(indices, (0..7).collect::<Vec<_>>());
}

#[test]
fn test_reroot() {
    let mut tree = parse_newick("(A:1,B:2,(C:3,D:4)x:5);").unwrap();
    let x = tree.node_by_name("x").unwrap();
    let total = tree.sum_branch_lengths();

    tree.reroot(x).unwrap();
    assert_eq!(tree.root(), Some(x));
    assert!(tree.validate().is_ok());
    assert_eq!(tree.child_ids(x).len(), 3);
    assert_eq!(tree.sum_branch_lengths(), total);
    assert_eq!(tree.node(x).unwrap().index(), 0);

    let written = tree.newick();
    tree.reroot(x).unwrap();
    assert_eq!(tree.newick(), written);

    let mut other = parse_newick("(E,F,G,H,I,J,K,L);").unwrap();
    let foreign = other.add_new_node(Some("M"));
    assert!(matches!(
        tree.reroot(foreign),
        Err(TreeError::NodeNotInTree(_))
    ));
    assert!(other.node_exists(foreign));
}

#[test]
fn test_reroot_on_a_leaf() {
    let mut tree = parse_newick("(A,(B,C)x);").unwrap();
    let a = tree.node_by_name("A").unwrap();
    tree.reroot(a).unwrap();

    assert!(tree.validate().is_ok());
    assert!(tree.is_tip(a));
    assert_eq!(tree.tip_count(), 3);
    let names: Vec<String> = tree.tip_names().iter().map(|n| n.to_string()).collect();
    assert_eq!(names, ["A", "B", "C"]);
    assert_eq!(tree.internal_nodes().len(), 2);

    // Rooting on an unnamed leaf leaves it out of the tips.
    let mut tree = parse_newick("((B,C)x,);").unwrap();
    let blank = tree.tips().into_iter().find(|&n| tree.name(n).is_none()).unwrap();
    tree.reroot(blank).unwrap();
    assert!(!tree.is_tip(blank));
    assert_eq!(tree.tip_count(), 2);
}

#[test]
fn test_reroot_first() {
    let mut tree = parse_newick("((A,B)x,C);").unwrap();
    let x = tree.node_by_name("x").unwrap();
    assert_eq!(tree.reroot_first().unwrap(), x);
    assert_eq!(tree.root(), Some(x));
    assert_eq!(tree.child_ids(x).len(), 3);
    assert!(tree.validate().is_ok());

    for newick in ["(A,B);", "((A,B,C,D),E);"] {
        let mut tree = parse_newick(newick).unwrap();
        assert!(
            matches!(tree.reroot_first(), Err(TreeError::NoTrifurcation)),
            "{newick}"
        );
    }
}

#[test]
fn test_graft_tip_on_edge() {
    let mut tree = parse_newick("((A:2,B:1)x:4,C:1);").unwrap();
    let x = tree.node_by_name("x").unwrap();
    let edge_id = tree.parent_link(x).unwrap().edge_id;
    tree.edge_mut(edge_id).unwrap().set_support(Some(90.0));
    let before = tree.sum_branch_lengths();

    let tip = tree.add_new_node(Some("D"));
    let middle = tree.graft_tip_on_edge(tip, edge_id).unwrap();

    assert!(tree.validate().is_ok());
    assert_eq!(tree.tip_count(), 4);
    assert_eq!(tree.parent_id(x), Some(middle));
    assert_eq!(tree.parent_id(tip), Some(middle));
    assert_eq!(tree.parent_id(middle), tree.root());
    assert!((tree.sum_branch_lengths() - (before + 1.0)).abs() < 1e-12);

    let upper = tree.edge(tree.parent_link(middle).unwrap().edge_id).unwrap();
    let lower = tree.edge(tree.parent_link(x).unwrap().edge_id).unwrap();
    assert_eq!(upper.length(), Some(2.0));
    assert_eq!(lower.length(), Some(2.0));
    assert_eq!(upper.support(), Some(90.0));
    assert_eq!(lower.support(), Some(90.0));

    // The new node takes the place of `x` among the root's children.
    let root = tree.root().unwrap();
    assert_eq!(tree.child_ids(root)[0], middle);
}

#[test]
fn test_display() {
    let tree = parse_newick("((A:1,B:2)x[note]:3,C:0.5);").unwrap();
    let printed = tree.to_string();
    println!("{printed}");
    assert!(printed.starts_with("Internal Nodes: 2\nTips: 3\nAll Nodes: 5\nRooted\n"));
    assert!(printed.contains("Tree length: 6.50000"));
    assert!(printed.contains("    - 1 | x | 3.000 | note\n"));
    assert!(printed.contains("        - 2 | A | 1.000 | \n"));
}

#[test]
fn test_compute_depths() {
    let mut tree = parse_newick("((A:1,B:2):3,C);").unwrap();
    tree.compute_depths();
    let depth = |tree: &Tree, name: &str| {
        tree.node(tree.node_by_name(name).unwrap()).unwrap().depth()
    };
    assert_eq!(depth(&tree, "A"), Some(4.0));
    assert_eq!(depth(&tree, "B"), Some(5.0));
    assert_eq!(depth(&tree, "C"), None);
}

#[test]
fn test_random_binary_tree_rejects_small_sizes() {
    let mut rng = StdRng::seed_from_u64(1);
    for nbtips in [0, 1] {
        assert!(matches!(
            random_binary_tree(nbtips, &mut rng),
            Err(TreeError::TooFewTips(n)) if n == nbtips
        ));
    }

    let pair = random_binary_tree(2, &mut rng).unwrap();
    assert_eq!(pair.tip_count(), 2);
    assert_eq!(pair.node_count(), 3);
    assert!(pair.validate().is_ok());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_binary_trees_are_binary(nbtips in 3usize..60, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let tree = random_binary_tree(nbtips, &mut rng).unwrap();

        prop_assert!(tree.validate().is_ok());
        prop_assert_eq!(tree.tip_count(), nbtips);
        prop_assert_eq!(tree.node_count(), 2 * nbtips - 2);
        prop_assert_eq!(tree.degree(tree.root().unwrap()), 3);
        for node_id in tree.internal_nodes() {
            prop_assert_eq!(tree.degree(node_id), 3);
        }
        for edge_id in tree.edge_ids_all() {
            let length = tree.edge(edge_id).unwrap().length().unwrap();
            prop_assert!((0.0..1.0).contains(&length));
        }
    }

    #[test]
    fn written_trees_parse_back(nbtips in 2usize..40, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let tree = random_binary_tree(nbtips, &mut rng).unwrap();
        let written = tree.newick();
        let reparsed = parse_newick(&written).unwrap();

        prop_assert_eq!(reparsed.node_count(), tree.node_count());
        prop_assert_eq!(reparsed.tip_names(), tree.tip_names());
        prop_assert_eq!(reparsed.newick(), written);
    }
}

use std::path::Path;

use test_log::test;

use nabor::io::read_geometry;
use nabor::{CnaAnalysis, PatternLibrary, State};

fn analyze(poscar: &str) -> (State, CnaAnalysis) {
    let cell = read_geometry(Path::new(poscar)).unwrap();
    let state = State::build(cell).unwrap();
    let analysis = CnaAnalysis::new(&state);
    (state, analysis)
}

#[test]
fn test_fcc_slab_classification() {
    // 7-layer 3x3 fcc(111) slab: the outer layers carry the (111) surface
    // fingerprint, everything in between is bulk
    let (_, analysis) = analyze("tests/assets/POSCAR");

    for atom in (0..9).chain(54..63) {
        assert_eq!(
            analysis.fingerprint(atom),
            "3(4,2,1)6(3,1,1)",
            "atom {}",
            atom
        );
    }
    for atom in 9..54 {
        assert_eq!(analysis.fingerprint(atom), "12(4,2,1)", "atom {}", atom);
    }

    let library = PatternLibrary::load(Path::new("tests/assets/patterns.json")).unwrap();
    assert_eq!(library.identify(analysis.fingerprint(0)).unwrap(), "FCC(111)");
    assert_eq!(library.identify(analysis.fingerprint(20)).unwrap(), "FCC Bulk");
}

#[test]
fn test_fcc_bulk_classification() {
    let (_, analysis) = analyze("tests/assets/POSCAR_fcc");

    for atom in 0..4 {
        assert_eq!(analysis.fingerprint(atom), "12(4,2,1)");
        assert_eq!(analysis.neighbor_ids[atom].len(), 12);
    }
}

#[test]
fn test_fingerprints_match_pattern_syntax() {
    let (_, analysis) = analyze("tests/assets/POSCAR");
    for fingerprint in &analysis.fingerprints {
        assert!(PatternLibrary::is_valid_fingerprint(fingerprint));
    }
}

#[test]
fn test_adjacency_matrices_symmetric_zero_diagonal() {
    let (_, analysis) = analyze("tests/assets/POSCAR_fcc");
    for adjacency in &analysis.adjacency_matrices {
        for i in 0..adjacency.nrows() {
            assert!(!adjacency[(i, i)]);
            for j in 0..adjacency.ncols() {
                assert_eq!(adjacency[(i, j)], adjacency[(j, i)]);
            }
        }
    }
}

#[test]
fn test_periodic_neighbors_reach_into_images() {
    // every atom of the 4-atom conventional cell needs periodic images to
    // complete its 12-neighbor shell
    let (state, analysis) = analyze("tests/assets/POSCAR_fcc");
    for atom in 0..state.nr_atoms() {
        assert!(analysis.neighbor_ids[atom]
            .iter()
            .any(|&id| id >= state.nr_atoms()));
    }
}

//! Integration tests pinning the byte layout fed into directory digests

use merkle_snapshots::snapshot::hasher::{
    compute_directory_hash, DIRECTORY_SIGNATURE, MISSING_FILE_SIGNATURE,
};
use merkle_snapshots::snapshot::{
    AccessType, Blake3, ChildOrdering, EmptyDirectoryHandling, FileMetadata, HashFunction, Hasher,
    LeafSnapshot, LocationSnapshot, MerkleDirectorySnapshotBuilder,
};
use merkle_snapshots::types::Hash;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    PutHash(Hash),
    PutString(String),
    PutBytes(Vec<u8>),
}

/// Hash function that records every accumulator's input sequence
#[derive(Clone, Default)]
struct RecordingHashFunction {
    finished: Rc<RefCell<Vec<Vec<Op>>>>,
}

struct RecordingHasher {
    ops: Vec<Op>,
    inner: <Blake3 as HashFunction>::Hasher,
    finished: Rc<RefCell<Vec<Vec<Op>>>>,
}

impl Hasher for RecordingHasher {
    fn put_hash(&mut self, hash: &Hash) {
        self.ops.push(Op::PutHash(*hash));
        self.inner.put_hash(hash);
    }

    fn put_string(&mut self, value: &str) {
        self.ops.push(Op::PutString(value.to_string()));
        self.inner.put_string(value);
    }

    fn put_bytes(&mut self, bytes: &[u8]) {
        self.ops.push(Op::PutBytes(bytes.to_vec()));
        self.inner.put_bytes(bytes);
    }

    fn hash(self) -> Hash {
        self.finished.borrow_mut().push(self.ops);
        self.inner.hash()
    }
}

impl HashFunction for RecordingHashFunction {
    type Hasher = RecordingHasher;

    fn new_hasher(&self) -> RecordingHasher {
        RecordingHasher {
            ops: Vec::new(),
            inner: Blake3.new_hasher(),
            finished: Rc::clone(&self.finished),
        }
    }
}

fn leaf(dir: &str, name: &str, hash: Hash) -> LeafSnapshot {
    LeafSnapshot::regular_file(
        format!("{}/{}", dir, name),
        name,
        AccessType::Direct,
        hash,
        FileMetadata {
            length: 0,
            last_modified: 0,
        },
    )
}

#[test]
fn test_fold_appends_signature_then_name_hash_pairs() {
    let recording = RecordingHashFunction::default();
    let mut builder =
        MerkleDirectorySnapshotBuilder::with_hash_function(ChildOrdering::SortByName, recording.clone());

    builder.enter_directory(
        AccessType::Direct,
        "/d",
        "d",
        EmptyDirectoryHandling::IncludeEmptyDirs,
    );
    builder.visit_leaf(leaf("/d", "b", [2u8; 32])).unwrap();
    builder.visit_leaf(leaf("/d", "a", [1u8; 32])).unwrap();
    assert!(builder.exit_directory().unwrap());
    builder.result().unwrap().unwrap();

    let dir_signature = Blake3.signature(DIRECTORY_SIGNATURE);
    let finished = recording.finished.borrow();

    // The signature itself is computed through the injected function
    assert!(finished.contains(&vec![
        Op::PutString("SIGNATURE".to_string()),
        Op::PutString(DIRECTORY_SIGNATURE.to_string()),
    ]));

    let fold = finished
        .iter()
        .find(|ops| ops.first() == Some(&Op::PutHash(dir_signature)))
        .expect("directory fold recorded");
    assert_eq!(
        fold,
        &vec![
            Op::PutHash(dir_signature),
            Op::PutString("a".to_string()),
            Op::PutHash([1u8; 32]),
            Op::PutString("b".to_string()),
            Op::PutHash([2u8; 32]),
        ]
    );
}

fn single_leaf_root<H: HashFunction>(
    mut builder: MerkleDirectorySnapshotBuilder<H>,
) -> Hash {
    builder.enter_directory(
        AccessType::Direct,
        "/d",
        "d",
        EmptyDirectoryHandling::IncludeEmptyDirs,
    );
    builder.visit_leaf(leaf("/d", "x", [7u8; 32])).unwrap();
    builder.exit_directory().unwrap();
    *builder.result().unwrap().unwrap().hash()
}

#[test]
fn test_injected_function_matches_default_digest() {
    let recorded = single_leaf_root(MerkleDirectorySnapshotBuilder::with_hash_function(
        ChildOrdering::SortByName,
        RecordingHashFunction::default(),
    ));
    let default = single_leaf_root(MerkleDirectorySnapshotBuilder::sorting_required());
    assert_eq!(recorded, default);
}

/// Traversal of:
///
/// ```text
/// project/
///   src/main.txt
///   docs/        (empty)
///   README
/// ```
#[test]
fn test_example_project_digests() {
    let dir_signature = Blake3.signature(DIRECTORY_SIGNATURE);
    let h_main = [0x11u8; 32];
    let h_readme = [0x22u8; 32];

    let run = |handling: EmptyDirectoryHandling| -> LocationSnapshot {
        let mut builder = MerkleDirectorySnapshotBuilder::sorting_required();
        builder.enter_directory(AccessType::Direct, "/project", "project", handling);
        builder.enter_directory(AccessType::Direct, "/project/src", "src", handling);
        builder
            .visit_leaf(leaf("/project/src", "main.txt", h_main))
            .unwrap();
        assert!(builder.exit_directory().unwrap());
        builder.enter_directory(AccessType::Direct, "/project/docs", "docs", handling);
        let docs_kept = builder.exit_directory().unwrap();
        assert_eq!(
            docs_kept,
            handling == EmptyDirectoryHandling::IncludeEmptyDirs
        );
        builder
            .visit_leaf(leaf("/project", "README", h_readme))
            .unwrap();
        assert!(builder.exit_directory().unwrap());
        builder.result().unwrap().unwrap()
    };

    let d_src = compute_directory_hash(&Blake3, &dir_signature, [("main.txt", &h_main)]);

    let excluded = run(EmptyDirectoryHandling::ExcludeEmptyDirs);
    let expected = compute_directory_hash(
        &Blake3,
        &dir_signature,
        [("README", &h_readme), ("src", &d_src)],
    );
    assert_eq!(excluded.hash(), &expected);
    assert_eq!(excluded.as_directory().unwrap().children().len(), 2);

    let included = run(EmptyDirectoryHandling::IncludeEmptyDirs);
    let d_docs = compute_directory_hash(&Blake3, &dir_signature, std::iter::empty());
    assert_eq!(d_docs, dir_signature_only(&dir_signature));
    let expected = compute_directory_hash(
        &Blake3,
        &dir_signature,
        [("README", &h_readme), ("docs", &d_docs), ("src", &d_src)],
    );
    assert_eq!(included.hash(), &expected);
}

fn dir_signature_only(dir_signature: &Hash) -> Hash {
    let mut hasher = Blake3.new_hasher();
    hasher.put_hash(dir_signature);
    hasher.hash()
}

#[test]
fn test_missing_leaves_hash_to_signature() {
    let missing = LeafSnapshot::missing("/gone", "gone", AccessType::Direct, &Blake3);
    assert_eq!(missing.hash(), &Blake3.signature(MISSING_FILE_SIGNATURE));
    assert_ne!(
        Blake3.signature(MISSING_FILE_SIGNATURE),
        Blake3.signature(DIRECTORY_SIGNATURE)
    );
}

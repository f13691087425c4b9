//! Hermetic linker checks over synthesized object files.
//!
//! The merge itself needs the native linker; the correctness checks around
//! it do not, so they are exercised here against objects built in-memory.

use std::collections::BTreeSet;
use std::io::Write;

use object::write::{Object, Symbol, SymbolSection};
use object::{Architecture, BinaryFormat, Endianness, SectionKind, SymbolFlags, SymbolKind, SymbolScope};

use crate::linker::{LinkError, defined_globals, reject_duplicates, verify_export};

/// Build a minimal ELF relocatable defining one text symbol per name.
fn tiny_object(symbols: &[&str]) -> Vec<u8> {
    let mut obj = Object::new(BinaryFormat::Elf, Architecture::X86_64, Endianness::Little);
    let text = obj.add_section(Vec::new(), b".text".to_vec(), SectionKind::Text);
    for name in symbols {
        // One `ret` per symbol.
        let offset = obj.append_section_data(text, &[0xc3], 1);
        obj.add_symbol(Symbol {
            name: name.as_bytes().to_vec(),
            value: offset,
            size: 1,
            kind: SymbolKind::Text,
            scope: SymbolScope::Linkage,
            weak: false,
            section: SymbolSection::Section(text),
            flags: SymbolFlags::None,
        });
    }
    obj.write().expect("object emission")
}

fn write_object(symbols: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&tiny_object(symbols)).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn defined_globals_reads_symbol_table() {
    let obj = write_object(&["add", "add__kernel"]);
    let defs = defined_globals(obj.path()).unwrap();
    assert_eq!(defs, BTreeSet::from(["add".to_string(), "add__kernel".to_string()]));
}

#[test]
fn duplicate_definitions_are_rejected() {
    let kernel = defined_globals(write_object(&["matmul__kernel", "helper"]).path()).unwrap();
    let shim = defined_globals(write_object(&["matmul", "helper"]).path()).unwrap();
    let err = reject_duplicates(&kernel, &shim).unwrap_err();
    match err {
        LinkError::DuplicateSymbol { symbol } => assert_eq!(symbol, "helper"),
        other => panic!("expected duplicate-symbol error, got {other:?}"),
    }
}

#[test]
fn disjoint_definitions_pass() {
    let kernel = defined_globals(write_object(&["add__kernel"]).path()).unwrap();
    let shim = defined_globals(write_object(&["add"]).path()).unwrap();
    assert!(reject_duplicates(&kernel, &shim).is_ok());
}

#[test]
fn export_verification() {
    let obj = write_object(&["matmul_chain"]);
    assert!(verify_export(obj.path(), "matmul_chain").is_ok());

    let err = verify_export(obj.path(), "missing_entry").unwrap_err();
    assert!(matches!(err, LinkError::MissingExport { symbol } if symbol == "missing_entry"));
}

#[test]
fn unparsable_object_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"not an object file").unwrap();
    file.flush().unwrap();
    let err = defined_globals(file.path()).unwrap_err();
    assert!(matches!(err, LinkError::Parse { .. }), "got {err:?}");
}

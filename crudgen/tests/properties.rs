//! Property tests for field classification and generation determinism

use crudgen::prelude::*;
use proptest::prelude::*;

/// A record of `width` plain fields with `ID` and `DeletedAt` spliced in
fn record(width: usize, primary_at: usize, soft_delete_at: usize) -> RecordMetadata {
    let mut names: Vec<String> = (0..width).map(|i| format!("F{i}")).collect();
    names.insert(primary_at.min(names.len()), "ID".to_string());
    names.insert(soft_delete_at.min(names.len()), "DeletedAt".to_string());

    let specs = names
        .iter()
        .map(|name| FieldSpec::new(name.clone(), "string").column(name.to_lowercase()))
        .collect();
    RecordMetadata::new("Rec", specs).unwrap()
}

fn arb_record() -> impl Strategy<Value = RecordMetadata> {
    (1usize..8, 0usize..8, 0usize..9).prop_map(|(w, p, s)| record(w, p, s))
}

fn arb_override(record: &RecordMetadata) -> impl Strategy<Value = Option<Vec<String>>> {
    let names: Vec<String> = record.fields().iter().map(|f| f.name().to_string()).collect();
    let len = names.len();
    prop::option::of(prop::sample::subsequence(names, 0..=len).prop_shuffle())
}

fn arb_role(record: &RecordMetadata) -> impl Strategy<Value = Option<String>> {
    let names: Vec<String> = record.fields().iter().map(|f| f.name().to_string()).collect();
    prop::option::of(prop::sample::select(names))
}

fn arb_case() -> impl Strategy<Value = (RecordMetadata, Overrides)> {
    arb_record().prop_flat_map(|record| {
        let overrides = (arb_override(&record), arb_override(&record)).prop_map(|(read, write)| {
            Overrides {
                read_fields: read,
                write_fields: write,
                ..Overrides::default()
            }
        });
        (Just(record), overrides)
    })
}

/// Like [`arb_case`], with primary and soft-delete overrides as well
fn arb_role_case() -> impl Strategy<Value = (RecordMetadata, Overrides)> {
    arb_case().prop_flat_map(|(record, overrides)| {
        let roles = (arb_role(&record), arb_role(&record)).prop_map(move |(primary, soft_delete)| {
            Overrides {
                primary_field: primary,
                soft_delete_field: soft_delete,
                ..overrides.clone()
            }
        });
        (Just(record), roles)
    })
}

proptest! {
    #[test]
    fn test_roles_stay_disjoint((record, overrides) in arb_case()) {
        let state = FieldClassifier::classify(record, &overrides).unwrap();
        let roles = &state.roles;

        let primary = roles.primary().unwrap();
        let soft_delete = roles.soft_delete().unwrap();
        prop_assert!(!roles.write().contains(&primary));
        prop_assert!(!roles.read().contains(&soft_delete));
        prop_assert!(!roles.write().contains(&soft_delete));
    }

    #[test]
    fn test_role_overrides_stay_disjoint((record, overrides) in arb_role_case()) {
        match FieldClassifier::classify(record, &overrides) {
            Ok(state) => {
                let roles = &state.roles;
                let primary = roles.primary().unwrap();
                let soft_delete = roles.soft_delete().unwrap();
                prop_assert_ne!(primary, soft_delete);
                prop_assert!(!roles.write().contains(&primary));
                prop_assert!(!roles.read().contains(&soft_delete));
                prop_assert!(!roles.write().contains(&soft_delete));
            }
            Err(GenerateError::ConflictingRoles { field, .. }) => {
                let primary = overrides.primary_field.as_deref().unwrap_or("ID");
                let soft_delete = overrides.soft_delete_field.as_deref().unwrap_or("DeletedAt");
                prop_assert_eq!(primary, soft_delete);
                prop_assert_eq!(field.as_str(), primary);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn test_default_sets_cover_every_field(record in arb_record()) {
        let total = record.fields().len();
        let state = FieldClassifier::classify(record, &Overrides::default()).unwrap();
        let roles = &state.roles;

        prop_assert_eq!(roles.read().len(), total - 1);
        prop_assert_eq!(roles.write().len(), total - 2);
        prop_assert!(roles.read().contains(&roles.primary().unwrap()));
    }

    #[test]
    fn test_columns_follow_declaration_order((record, overrides) in arb_case()) {
        let state = FieldClassifier::classify(record, &overrides).unwrap();
        let roles = &state.roles;

        let read: Vec<usize> = roles.read().iter().copied().collect();
        let positions: Vec<usize> = roles
            .read_field_names("")
            .iter()
            .map(|name| roles.record().position(name).unwrap())
            .collect();
        prop_assert_eq!(positions, read);
        let write: Vec<usize> = roles.write().iter().copied().collect();
        let positions: Vec<usize> = roles
            .write_field_columns("")
            .iter()
            .map(|column| {
                roles
                    .record()
                    .fields()
                    .iter()
                    .position(|f| f.column() == column)
                    .unwrap()
            })
            .collect();
        prop_assert_eq!(positions, write);
    }

    #[test]
    fn test_generation_is_deterministic((record, overrides) in arb_case(), parallel in any::<bool>()) {
        let settings = GeneratorSettings {
            read_fields: overrides.read_fields,
            write_fields: overrides.write_fields,
            ..GeneratorSettings::default()
        };
        let sequential = CrudGenerator::new(settings.clone()).unwrap();
        let other = CrudGenerator::new(GeneratorSettings { parallel, ..settings }).unwrap();

        let first = sequential.generate(record.clone(), "store").map_err(|e| e.to_string());
        let second = other.generate(record, "store").map_err(|e| e.to_string());
        prop_assert_eq!(first, second);
    }
}

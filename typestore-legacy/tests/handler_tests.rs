mod common;

use common::{definition, field, mapper_with, person, reference, reflective};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use typestore_codec::TypeDictionaryCodec;
use typestore_legacy::{
    CustomHandlerDeriver, CustomLegacyTypeHandler, Instance, LegacyError, LegacyResult,
    LegacyTypeHandlerCreator, LegacyTypeMapper, LegacyTypeMappingResult, ObjectId,
    ReflectiveTypeHandler, ReroutingDeriver, TypeHandler, TypeSimilarityTable, ValueTranslator,
};
use typestore_schema::{ErrorKind, RuntimeType, TypeDefinition, TypeId};

/// Hand-authored current handler that counts the records it loads.
#[derive(Debug)]
struct CountingHandler {
    inner: ReflectiveTypeHandler,
    creates: AtomicUsize,
}

impl CountingHandler {
    fn new(definition: &Arc<TypeDefinition>) -> Arc<Self> {
        Arc::new(Self {
            inner: ReflectiveTypeHandler::new(Arc::clone(definition)),
            creates: AtomicUsize::new(0),
        })
    }
}

impl TypeHandler for CountingHandler {
    fn type_definition(&self) -> &Arc<TypeDefinition> {
        self.inner.type_definition()
    }

    fn runtime_type(&self) -> Option<&RuntimeType> {
        self.inner.runtime_type()
    }

    fn is_custom(&self) -> bool {
        true
    }

    fn create(&self, record: &[u8]) -> LegacyResult<Instance> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create(record)
    }

    fn update(&self, record: &[u8], instance: &mut Instance) -> LegacyResult<()> {
        self.inner.update(record, instance)
    }

    fn store(&self, instance: &Instance) -> LegacyResult<Vec<u8>> {
        self.inner.store(instance)
    }

    fn iterate_instance_references(
        &self,
        instance: &Instance,
        visitor: &mut dyn FnMut(ObjectId),
    ) -> LegacyResult<()> {
        self.inner.iterate_instance_references(instance, visitor)
    }

    fn iterate_persisted_references(
        &self,
        record: &[u8],
        visitor: &mut dyn FnMut(ObjectId),
    ) -> LegacyResult<()> {
        self.inner.iterate_persisted_references(record, visitor)
    }
}

#[derive(Default)]
struct RecordingDeriver {
    called: AtomicBool,
}

impl CustomHandlerDeriver for RecordingDeriver {
    fn derive(
        &self,
        result: &LegacyTypeMappingResult,
        translator: &Arc<dyn ValueTranslator>,
    ) -> LegacyResult<Arc<dyn TypeHandler>> {
        self.called.store(true, Ordering::SeqCst);
        ReroutingDeriver.derive(result, translator)
    }
}

fn name_and_age(type_id: u64) -> Arc<TypeDefinition> {
    definition(
        type_id,
        "Person",
        vec![field("String", "Person", "name"), field("int", "Person", "age")],
    )
}

fn age_and_name(type_id: u64) -> Arc<TypeDefinition> {
    definition(
        type_id,
        "Person",
        vec![field("int", "Person", "age"), field("String", "Person", "name")],
    )
}

fn name_and_age_record(name: u64, age: i32) -> Vec<u8> {
    let mut record = reference(name);
    record.extend_from_slice(&age.to_le_bytes());
    record
}

fn references_in(handler: &dyn TypeHandler, record: &[u8]) -> Vec<ObjectId> {
    let mut visited = Vec::new();
    handler
        .iterate_persisted_references(record, &mut |id| visited.push(id))
        .unwrap();
    visited
}

// ── Reflective derivation ────────────────────────────────────────

#[test]
fn deleted_member_bytes_are_skipped() {
    let mapper = LegacyTypeMapper::new();
    let current = person(6, &["name"]);
    let handler = mapper
        .ensure_legacy_type_handler(&name_and_age(5), Some(reflective(&current)))
        .unwrap();
    assert_eq!(handler.state_name(), "reflective-derived");

    let record = name_and_age_record(42, 30);
    let instance = handler.create(&record).unwrap();

    assert_eq!(instance.type_id(), TypeId::new(6));
    assert_eq!(instance.values(), &[reference(42)]);
    assert_eq!(handler.store(&instance).unwrap(), reference(42));
    assert_eq!(references_in(handler.as_ref(), &record), vec![ObjectId::new(42)]);
}

#[test]
fn new_members_keep_their_zero_value() {
    let mapper = LegacyTypeMapper::new();
    let current = name_and_age(6);
    let handler = mapper
        .ensure_legacy_type_handler(&person(5, &["name"]), Some(reflective(&current)))
        .unwrap();

    let mut instance = Instance::new(&current);
    instance.set_value(1, 99i32.to_le_bytes().to_vec());
    handler.update(&reference(7), &mut instance).unwrap();

    assert_eq!(instance.values(), &[reference(7), vec![0; 4]]);
    let mut visited = Vec::new();
    handler
        .iterate_instance_references(&instance, &mut |id| visited.push(id))
        .unwrap();
    assert_eq!(visited, vec![ObjectId::new(7)]);
}

#[test]
fn widened_values_are_sign_extended() {
    let legacy = definition(5, "Item", vec![field("int", "Item", "count")]);
    let current = definition(6, "Item", vec![field("long", "Item", "count")]);
    let mut table = TypeSimilarityTable::new();
    table.insert("int", "long", 0.8);
    let mapper = LegacyTypeMapper::new().with_type_similarity(table);

    let handler = mapper
        .ensure_legacy_type_handler(&legacy, Some(reflective(&current)))
        .unwrap();
    let instance = handler.create(&(-2i32).to_le_bytes()).unwrap();

    assert_eq!(instance.values(), &[(-2i64).to_le_bytes().to_vec()]);
}

#[test]
fn inherited_fields_load_into_their_own_slots() {
    let legacy = definition(5, "Sub", vec![field("int", "Base", "id"), field("int", "Sub", "id")]);
    let current = definition(
        6,
        "Sub",
        vec![
            field("int", "Sub", "id"),
            field("int", "Base", "id"),
            field("int", "Sub", "extra"),
        ],
    );
    let handler = LegacyTypeMapper::new()
        .ensure_legacy_type_handler(&legacy, Some(reflective(&current)))
        .unwrap();

    let mut record = 1i32.to_le_bytes().to_vec();
    record.extend_from_slice(&2i32.to_le_bytes());
    let instance = handler.create(&record).unwrap();

    assert_eq!(
        instance.values(),
        &[
            2i32.to_le_bytes().to_vec(),
            1i32.to_le_bytes().to_vec(),
            vec![0; 4],
        ]
    );
}

#[test]
fn truncated_legacy_record_fails() {
    let mapper = LegacyTypeMapper::new();
    let handler = mapper
        .ensure_legacy_type_handler(&name_and_age(5), Some(reflective(&person(6, &["name"]))))
        .unwrap();

    let err = handler.create(&reference(42)).unwrap_err();

    assert!(matches!(err, LegacyError::TruncatedRecord { needed: 4, .. }));
    assert_eq!(err.kind(), ErrorKind::Consistency);
}

// ── Direct wrapper ───────────────────────────────────────────────

#[test]
fn renamed_members_load_through_the_current_handler() {
    let mapper = mapper_with(&[("Person#firstName", "Person#givenName")]);
    let legacy = person(5, &["firstName", "lastName"]);
    let current = reflective(&person(6, &["givenName", "lastName"]));

    let handler = mapper
        .ensure_legacy_type_handler(&legacy, Some(Arc::clone(&current)))
        .unwrap();
    assert_eq!(handler.state_name(), "direct-wrapper");
    assert_eq!(handler.type_definition().type_id(), TypeId::new(5));

    let mut record = reference(1);
    record.extend(reference(2));
    assert_eq!(handler.create(&record).unwrap(), current.create(&record).unwrap());
}

// ── Custom derivation ────────────────────────────────────────────

#[test]
fn custom_current_handler_receives_rerouted_records() {
    let mapper = LegacyTypeMapper::new();
    let current = CountingHandler::new(&age_and_name(6));

    let handler = mapper
        .ensure_legacy_type_handler(
            &name_and_age(5),
            Some(Arc::clone(&current) as Arc<dyn TypeHandler>),
        )
        .unwrap();
    assert_eq!(handler.state_name(), "custom-derived");
    assert!(handler.is_custom());

    let record = name_and_age_record(42, 30);
    let instance = handler.create(&record).unwrap();

    assert_eq!(current.creates.load(Ordering::SeqCst), 1);
    assert_eq!(instance.values(), &[30i32.to_le_bytes().to_vec(), reference(42)]);
    assert_eq!(references_in(handler.as_ref(), &record), vec![ObjectId::new(42)]);
}

#[test]
fn type_specific_deriver_is_preferred() {
    let deriver = Arc::new(RecordingDeriver::default());
    let mut creator = LegacyTypeHandlerCreator::default();
    creator.register_custom_deriver(
        "Person",
        Arc::clone(&deriver) as Arc<dyn CustomHandlerDeriver>,
    );
    let mapper = LegacyTypeMapper::new().with_creator(creator);
    let current = CountingHandler::new(&age_and_name(6));

    mapper
        .ensure_legacy_type_handler(&name_and_age(5), Some(current as Arc<dyn TypeHandler>))
        .unwrap();

    assert!(deriver.called.load(Ordering::SeqCst));
}

// ── Hand-authored legacy handlers ────────────────────────────────

#[test]
fn hand_authored_handler_matches_by_shape() {
    let custom = reflective(&person(1, &["firstName"]));
    let mapper = LegacyTypeMapper::new().with_custom_handler(CustomLegacyTypeHandler::new(custom));

    let handler = mapper
        .ensure_legacy_type_handler(
            &person(8, &["firstName"]),
            Some(reflective(&person(9, &["name"]))),
        )
        .unwrap();

    assert_eq!(handler.state_name(), "hand-authored");
}

#[test]
fn hand_authored_handler_with_fixed_id_must_match() {
    let custom = reflective(&person(1, &["firstName"]));
    let mapper = LegacyTypeMapper::new()
        .with_custom_handler(CustomLegacyTypeHandler::with_fixed_type_id(custom, TypeId::new(7)));

    let err = mapper
        .ensure_legacy_type_handler(
            &person(7, &["givenName"]),
            Some(reflective(&person(9, &["name"]))),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        LegacyError::CustomHandlerMismatch { type_id, .. } if type_id == TypeId::new(7)
    ));
    assert_eq!(err.kind(), ErrorKind::Consistency);
}

// ── Caching ──────────────────────────────────────────────────────

#[test]
fn handlers_are_derived_once_per_type_id() {
    let mapper = LegacyTypeMapper::new();
    let legacy = name_and_age(5);
    let current = reflective(&person(6, &["name"]));

    let first = mapper
        .ensure_legacy_type_handler(&legacy, Some(Arc::clone(&current)))
        .unwrap();
    let second = mapper.ensure_legacy_type_handler(&legacy, None).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(mapper.cached_len(), 1);
    assert!(mapper.cached_handler(TypeId::new(5)).is_some());
}

#[test]
fn dictionary_text_drives_handler_derivation() {
    let text = "
        1 Person { String Person#firstName, String Person#lastName, }
        2 Person { String Person#givenName, String Person#lastName, }
    ";
    let dictionary = TypeDictionaryCodec::default().load(text).unwrap();
    let current = reflective(&dictionary.lookup_by_id(TypeId::new(2)).unwrap());
    let mapper = mapper_with(&[("Person#firstName", "Person#givenName")]);

    let handlers = mapper
        .ensure_legacy_type_handlers(&dictionary, |name| {
            (name == "Person").then(|| Arc::clone(&current))
        })
        .unwrap();

    assert_eq!(handlers.len(), 1);
    assert_eq!(handlers[0].to_string(), "1 Person (direct-wrapper)");
}

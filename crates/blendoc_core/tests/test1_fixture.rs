#![allow(missing_docs)]

use blendoc_core::blend::{BlendError, File, FieldValue, PointerTarget};
use blendoc_testkit::{Test1Fixture, test1_addr};

fn open_fixture() -> File {
	File::from_bytes(Test1Fixture::build()).expect("synthetic fixture opens")
}

#[test]
fn header_reports_version_pointer_width_and_endian() {
	let file = open_fixture();
	let header = file.header();
	assert_eq!((header.version.major, header.version.minor, header.version.rev), (2, 7, 7));
	assert_eq!(header.pointer_width, 8);
	assert_eq!(header.endian.as_str(), "little");
}

#[test]
fn world_factory_has_exactly_one_block() {
	let file = open_fixture();
	assert_eq!(file.list("World").expect("World factory").len(), 1);
}

#[test]
fn world_mtex_array_has_eighteen_slots() {
	let file = open_fixture();
	let world = file.list("World").unwrap().find_by_name("TestWorld").expect("TestWorld found");
	match world.field("mtex").expect("mtex field") {
		FieldValue::Array(items) => assert_eq!(items.len(), Test1Fixture::WORLD_MTEX_COUNT),
		other => panic!("expected array, got {other:?}"),
	}
}

#[test]
fn world_mtex_pointer_array_resolves_to_a_per_slot_sequence() {
	let file = open_fixture();
	let world = file.list("World").unwrap().find_by_name("TestWorld").expect("TestWorld found");
	match world.pointer("mtex").expect("mtex pointer resolves") {
		PointerTarget::Sequence(slots) => {
			assert_eq!(slots.len(), Test1Fixture::WORLD_MTEX_COUNT);
			assert!(slots.iter().all(|slot| matches!(slot, PointerTarget::Null)), "every mtex slot is a null pointer in the fixture");
		}
		other => panic!("expected a per-slot sequence, got {other:?}"),
	}
}

#[test]
fn world_aodist_is_in_expected_window() {
	let file = open_fixture();
	let world = file.list("World").unwrap().find_by_name("TestWorld").expect("TestWorld found");
	match world.field("aodist").expect("aodist field") {
		FieldValue::F32(v) => assert!(v > 12.8999 && v < 12.90001, "aodist {v} outside expected window"),
		other => panic!("expected f32, got {other:?}"),
	}
}

#[test]
fn world_id_name_carries_the_producer_tag() {
	let file = open_fixture();
	let world = file.list("World").unwrap().find_by_name("TestWorld").expect("TestWorld found");
	let FieldValue::Struct(id) = world.field("id").expect("id field") else {
		panic!("expected embedded id struct");
	};
	match id.field("name").expect("name field") {
		FieldValue::String(name) => assert_eq!(name.as_ref(), "WOTestWorld"),
		other => panic!("expected string, got {other:?}"),
	}
}

#[test]
fn scene_world_pointer_resolves_to_the_same_record_by_value() {
	let file = open_fixture();
	let world = file.list("World").unwrap().find_by_name("TestWorld").expect("TestWorld found");
	let scene = file.list("Scene").unwrap().find_by_name("MyTestScene").expect("MyTestScene found");

	match scene.pointer("world").expect("world pointer resolves") {
		PointerTarget::One(resolved) => assert_eq!(resolved, world, "scene.world should compare equal to the World record"),
		other => panic!("expected a single record, got {other:?}"),
	}
}

#[test]
fn scene_id_next_is_null() {
	let file = open_fixture();
	let scene = file.list("Scene").unwrap().find_by_name("MyTestScene").expect("MyTestScene found");
	let FieldValue::Struct(id) = scene.field("id").expect("id field") else {
		panic!("expected embedded id struct");
	};
	assert!(matches!(id.pointer("next").expect("next pointer resolves"), PointerTarget::Null));
}

#[test]
fn suzanne_mesh_vertex_count_matches_mvert_block_length() {
	let file = open_fixture();
	let suzanne = file.list("Object").unwrap().find_by_name("Suzanne").expect("Suzanne found");

	let PointerTarget::One(mesh) = suzanne.pointer("data").expect("data pointer resolves") else {
		panic!("expected Suzanne.data to resolve to a single Mesh record");
	};

	let FieldValue::Int(totvert) = mesh.field("totvert").expect("totvert field") else {
		panic!("expected totvert to be an integer");
	};

	let PointerTarget::Many(verts) = mesh.pointer("mvert").expect("mvert pointer resolves") else {
		panic!("expected mvert to resolve to a sequence of records");
	};

	assert_eq!(totvert as usize, verts.len());
	assert_eq!(totvert, i64::from(Test1Fixture::SUZANNE_VERT_COUNT));
}

#[test]
fn find_by_name_on_an_unnameable_struct_is_rejected() {
	let file = open_fixture();
	let err = file.list("rctf").unwrap().find_by_name("x").expect_err("rctf has no ID field");
	assert!(matches!(err, BlendError::Unnameable { .. }));
}

#[test]
fn listing_an_unknown_struct_type_is_rejected() {
	let file = open_fixture();
	let err = file.list("foos").expect_err("foos is not a registered struct");
	assert!(matches!(err, BlendError::NotAStruct { .. }));
}

#[test]
fn relisting_a_struct_type_after_close_is_rejected() {
	let file = open_fixture();
	file.close();
	let err = file.list("World").expect_err("closed file should reject new factory creation");
	assert!(matches!(err, BlendError::ParentClosed));
}

#[test]
fn closing_the_file_blocks_pointer_resolution_on_existing_records() {
	let file = open_fixture();
	let scene = file.list("Scene").unwrap().find_by_name("MyTestScene").expect("MyTestScene found");
	file.close();
	let err = scene.pointer("world").expect_err("pointer resolution after close should fail");
	assert!(matches!(err, BlendError::ParentClosed));
}

#[test]
fn repeated_lookups_of_the_same_name_are_distinct_but_equal() {
	let file = open_fixture();
	let worlds = file.list("World").unwrap();
	let a = worlds.find_by_name("TestWorld").expect("first lookup");
	let b = worlds.find_by_name("TestWorld").expect("second lookup");
	assert_eq!(a, b);
}

#[test]
fn list_structures_includes_every_registered_struct_type() {
	let file = open_fixture();
	let structures = file.list_structures().expect("list_structures");
	for expected in ["ID", "Mesh", "MVert", "Object", "Scene", "World", "rctf"] {
		assert!(structures.iter().any(|name| name == expected), "missing {expected} in {structures:?}");
	}
}

#[test]
fn tree_is_a_pure_function_of_the_schema() {
	let file = open_fixture();
	let first = file.tree("World", true, None).expect("tree renders");
	let second = file.tree("World", true, None).expect("tree renders again");
	assert_eq!(first, second);
	assert!(first.contains("aodist: float"));
}

#[test]
fn header_offset_constants_match_the_fixture_module() {
	assert_eq!(test1_addr::WORLD, 0x1000);
	assert_eq!(test1_addr::SCENE, 0x2000);
}

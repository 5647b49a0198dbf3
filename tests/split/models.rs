use std::fs;

use dllsplit::assets::ModelFile;
use dllsplit::{SplitOptions, Splitter};

use crate::common::{object_label, read_manifest, Fixture, ImageBuilder};

/// A root node with one child, both exported on their own
fn nested_models() -> (Vec<u8>, u32, u32) {
    let mut b = ImageBuilder::new();
    let arm = b.object(None, None);
    let body = b.object(Some(arm), None);
    b.export("Body", body);
    b.export("Arm", arm);
    (b.build(), body, arm)
}

#[test]
fn contained_model_is_consolidated_into_its_parent() {
    let (image, body, arm) = nested_models();
    let project = "\
game=SA2B

[Arm]
type=chunkmodel
filename=Arm.sa2mdl

[Body]
type=chunkmodel
filename=Body.sa2mdl
";
    let fx = Fixture::new(image, project);
    let summary = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap();

    assert_eq!(summary.models_emitted, 1);
    assert_eq!(summary.models_consolidated, 1);
    assert!(fx.output("Body.sa2mdl").is_file());
    assert!(!fx.output("Arm.sa2mdl").exists());

    let manifest = read_manifest(&summary.manifest_path);
    assert_eq!(manifest.files.len(), 1);
    assert!(manifest
        .items
        .iter()
        .any(|i| i.export == "Arm" && i.label == object_label(arm)));
    assert!(manifest
        .items
        .iter()
        .any(|i| i.export == "Body" && i.label == object_label(body)));
}

#[test]
fn model_already_covered_is_not_queued() {
    let (image, _, arm) = nested_models();
    let project = "\
game=SA2B

[Body]
type=chunkmodel
filename=Body.sa2mdl

[Arm]
type=chunkmodel
filename=Arm.sa2mdl
";
    let fx = Fixture::new(image, project);
    let summary = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap();

    assert_eq!(summary.models_emitted, 1);
    assert_eq!(summary.models_consolidated, 0);
    assert!(!fx.output("Arm.sa2mdl").exists());

    let manifest = read_manifest(&summary.manifest_path);
    let arm_item = manifest.items.iter().find(|i| i.export == "Arm").unwrap();
    assert_eq!(arm_item.label, object_label(arm));
}

#[test]
fn model_array_skips_null_slots_and_honours_overrides() {
    let mut b = ImageBuilder::new();
    let first = b.object(None, None);
    let second = b.object(None, None);
    let array = b.pointer_array(&[Some(first), None, Some(second)]);
    b.export("Parts", array);

    let project = "\
game=SADX

[Parts]
type=basicdxmodelarray
filename=Parts
length=3
filename2=Lid
";
    let fx = Fixture::new(b.build(), project);
    let summary = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap();

    assert_eq!(summary.models_emitted, 2);
    let manifest = read_manifest(&summary.manifest_path);
    let files: Vec<(&str, &str)> = manifest
        .files
        .iter()
        .map(|(p, f)| (p.as_str(), f.file_type.as_str()))
        .collect();
    assert_eq!(
        files,
        vec![("Parts/000.sa1mdl", "basicdxmodel"), ("Parts/Lid.sa1mdl", "basicdxmodel")]
    );

    let indices: Vec<Option<usize>> = manifest.items.iter().map(|i| i.index).collect();
    assert_eq!(indices, vec![Some(0), Some(2)]);

    let lid = ModelFile::read(&fs::read(fx.output("Parts/Lid.sa1mdl")).unwrap()).unwrap();
    assert_eq!(lid.description.as_deref(), Some("Parts[2]"));
    assert_eq!(lid.model.label(), object_label(second));
}

#[test]
fn scalar_model_without_filename_is_a_configuration_error() {
    let mut b = ImageBuilder::new();
    let root = b.object(None, None);
    b.export("Body", root);
    let fx = Fixture::new(b.build(), "game=SA2B\n\n[Body]\ntype=model\n");

    let err = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap_err();
    assert_eq!(err.kind(), dllsplit::ErrorKind::Configuration);
}

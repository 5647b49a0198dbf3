use std::fs;
use std::path::Path;

use dllsplit::assets::{AnimationFile, ModelFile};
use dllsplit::hashing::md5_digest;
use dllsplit::paths::normalize;
use dllsplit::{SplitOptions, Splitter};

use crate::common::{object_label, read_manifest, Fixture, ImageBuilder};

const PROJECT: &str = "\
name=chr
game=SA2B

[MyModel]
type=model
filename=Models/MyModel.sa2mdl

[MyAnim]
type=actionarray
filename=Anims
length=4
";

/// MyModel is a two node tree; MyAnim[4] pairs it with three motions and
/// leaves slot 2 null. Returns the image and the root node's RVA.
fn model_with_actions() -> (Vec<u8>, u32) {
    let mut b = ImageBuilder::new();
    let child = b.object(None, None);
    let root = b.object(Some(child), None);
    let motions: Vec<u32> = (0..3).map(|k| b.motion(10 + k)).collect();
    let actions: Vec<u32> = motions.iter().map(|&m| b.action(root, m)).collect();
    let array = b.pointer_array(&[Some(actions[0]), Some(actions[1]), None, Some(actions[2])]);
    b.export("MyModel", root);
    b.export("MyAnim", array);
    (b.build(), root)
}

#[test]
fn model_and_action_array_end_to_end() {
    let (image, root) = model_with_actions();
    let fx = Fixture::new(image, PROJECT);
    let summary = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .expect("split succeeds");

    assert_eq!(summary.items, 2);
    assert_eq!(summary.models_emitted, 1);
    assert_eq!(summary.manifest_path, fx.output("chr_data.ini"));

    let manifest = read_manifest(&summary.manifest_path);
    assert_eq!(manifest.name, "chr");
    assert_eq!(manifest.game, "SA2B");

    let models: Vec<_> = manifest
        .files
        .iter()
        .filter(|(_, f)| f.file_type.ends_with("model"))
        .collect();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].0, "Models/MyModel.sa2mdl");
    assert_eq!(models[0].1.file_type, "chunkmodel");

    let anims: Vec<&str> = manifest
        .files
        .iter()
        .filter(|(_, f)| f.file_type == "animation")
        .map(|(p, _)| p.as_str())
        .collect();
    assert_eq!(anims, vec!["Anims/000.saanim", "Anims/001.saanim", "Anims/003.saanim"]);

    let motion_items: Vec<_> = manifest
        .items
        .iter()
        .filter(|i| i.field.as_deref() == Some("motion"))
        .map(|i| (i.index, i.label.as_str()))
        .collect();
    assert_eq!(
        motion_items,
        vec![(Some(0), "MyAnim_0"), (Some(1), "MyAnim_1"), (Some(3), "MyAnim_3")]
    );
    assert!(manifest
        .items
        .iter()
        .filter(|i| i.field.as_deref() == Some("object"))
        .all(|i| i.label == object_label(root)));
    assert!(manifest
        .items
        .iter()
        .any(|i| i.export == "MyModel" && i.index.is_none() && i.label == object_label(root)));

    let model_path = fx.output("Models/MyModel.sa2mdl");
    let model = ModelFile::read(&fs::read(&model_path).unwrap()).unwrap();
    assert_eq!(model.description.as_deref(), Some("MyModel"));
    assert_eq!(model.model.nodes.len(), 2);
    assert_eq!(model.animations.len(), 3);
    assert_eq!(
        Path::new(&model.animations[0]),
        Path::new("..").join("Anims").join("000.saanim")
    );
    let model_dir = model_path.parent().unwrap();
    for rel in &model.animations {
        assert!(normalize(&model_dir.join(rel)).is_file(), "{} does not resolve", rel);
    }

    let anim = AnimationFile::read(&fs::read(fx.output("Anims/000.saanim")).unwrap()).unwrap();
    assert_eq!(anim.motion.label, "MyAnim_0");
    assert_eq!(anim.motion.frames, 10);
    assert_eq!(anim.motion.node_count, 2);

    for (path, entry) in &manifest.files {
        let bytes = fs::read(fx.output(path)).unwrap();
        assert_eq!(entry.hash, md5_digest(&bytes), "hash of {}", path);
    }
}

#[test]
fn shared_motion_is_written_once() {
    let mut b = ImageBuilder::new();
    let root = b.object(None, None);
    let motion = b.motion(5);
    let first = b.action(root, motion);
    let second = b.action(root, motion);
    let array = b.pointer_array(&[Some(first), Some(second)]);
    b.export("Acts", array);

    let project = "game=SA2B\n\n[Acts]\ntype=actionarray\nfilename=Acts\nlength=2\n";
    let fx = Fixture::new(b.build(), project);
    let summary = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap();

    assert!(fx.output("Acts/000.saanim").is_file());
    assert!(!fx.output("Acts/001.saanim").exists());
    assert!(!fx.output("Acts/001.sa2mdl").exists());

    let manifest = read_manifest(&summary.manifest_path);
    let labels: Vec<&str> = manifest
        .items
        .iter()
        .filter(|i| i.field.as_deref() == Some("motion"))
        .map(|i| i.label.as_str())
        .collect();
    assert_eq!(labels, vec!["Acts_0", "Acts_0"]);

    // Not queued by a model directive, so the action writes its own model
    assert_eq!(manifest.files["Acts/000.sa2mdl"].file_type, "model");
    let model = ModelFile::read(&fs::read(fx.output("Acts/000.sa2mdl")).unwrap()).unwrap();
    assert_eq!(model.animations, vec!["000.saanim".to_string()]);
    assert_eq!(model.description.as_deref(), Some("Acts[0]->object"));
}

#[test]
fn action_reuses_motion_named_by_earlier_directive() {
    let mut b = ImageBuilder::new();
    let child = b.object(None, None);
    let root = b.object(Some(child), None);
    let motion = b.motion(40);
    let action = b.action(root, motion);
    let array = b.pointer_array(&[Some(action)]);
    b.export("Body", root);
    b.export("Walk", motion);
    b.export("Acts", array);

    let project = "\
game=SA2B

[Body]
type=model
filename=Body.sa2mdl

[Walk]
type=motion
nodecount=2
filename=Motions/Walk.saanim

[Acts]
type=actionarray
filename=Acts
length=1
";
    let fx = Fixture::new(b.build(), project);
    let summary = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap();

    assert!(fx.output("Motions/Walk.saanim").is_file());
    assert!(!fx.output("Acts/000.saanim").exists());

    let manifest = read_manifest(&summary.manifest_path);
    let motion_item = manifest
        .items
        .iter()
        .find(|i| i.export == "Acts" && i.field.as_deref() == Some("motion"))
        .unwrap();
    assert_eq!(motion_item.label, "Walk");

    let model = ModelFile::read(&fs::read(fx.output("Body.sa2mdl")).unwrap()).unwrap();
    assert_eq!(
        model.animations,
        vec![Path::new("Motions").join("Walk.saanim").to_string_lossy().into_owned()]
    );
}

#[test]
fn custom_animation_name_forces_a_write() {
    let (image, _) = model_with_actions();
    let project = format!("{}filename1_a=Run\n", PROJECT);
    let fx = Fixture::new(image, &project);
    let summary = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap();

    assert!(fx.output("Anims/Run.saanim").is_file());
    assert!(!fx.output("Anims/001.saanim").exists());

    let manifest = read_manifest(&summary.manifest_path);
    assert!(manifest.files.contains_key("Anims/Run.saanim"));
    let model = ModelFile::read(&fs::read(fx.output("Models/MyModel.sa2mdl")).unwrap()).unwrap();
    assert_eq!(
        Path::new(&model.animations[1]),
        Path::new("..").join("Anims").join("Run.saanim")
    );
}

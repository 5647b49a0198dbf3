use std::fs;

use dllsplit::assets::ModelFile;
use dllsplit::{SplitOptions, Splitter};

use crate::common::{label, object_label, read_manifest, Fixture, ImageBuilder};

fn item_labels(manifest: &dllsplit::manifest::OutputManifest, export: &str) -> Vec<(Option<usize>, String)> {
    manifest
        .items
        .iter()
        .filter(|i| i.export == export)
        .map(|i| (i.index, i.label.clone()))
        .collect()
}

#[test]
fn morph_of_an_emitted_attach_is_skipped() {
    let mut b = ImageBuilder::new();
    let shared = b.basic_attach(true);
    let fresh = b.basic_attach(true);
    let body = b.object(None, None);
    b.set_attach(body, shared);
    b.export("Body", body);
    b.export("Shared", shared);
    b.export("Fresh", fresh);

    let project = "\
game=SADX

[Body]
type=model
filename=Body.sa1mdl

[Shared]
type=morph
filename=Shared.sa1mdl

[Fresh]
type=morph
filename=Fresh.sa1mdl
";
    let fx = Fixture::new(b.build(), project);
    let summary = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap();

    assert!(fx.output("Body.sa1mdl").is_file());
    assert!(!fx.output("Shared.sa1mdl").exists());

    let manifest = read_manifest(&summary.manifest_path);
    assert_eq!(item_labels(&manifest, "Shared"), vec![(None, label("attach", shared))]);
    assert_eq!(item_labels(&manifest, "Fresh"), vec![(None, label("attach", fresh))]);
    assert_eq!(manifest.files["Fresh.sa1mdl"].file_type, "basicdxmodel");
    assert_eq!(manifest.files["Body.sa1mdl"].file_type, "basicdxmodel");

    let morph = ModelFile::read(&fs::read(fx.output("Fresh.sa1mdl")).unwrap()).unwrap();
    assert_eq!(morph.model.label(), object_label(fresh));
    assert_eq!(morph.model.attaches.len(), 1);
    assert_eq!(morph.model.attaches[0].label(), label("attach", fresh));
}

#[test]
fn models_array_gates_each_attach() {
    let mut b = ImageBuilder::new();
    let shared = b.basic_attach(false);
    let lid = b.basic_attach(false);
    let spare = b.basic_attach(false);
    let body = b.object(None, None);
    b.set_attach(body, shared);
    let parts = b.pointer_array(&[Some(shared), None, Some(spare), Some(lid)]);
    b.export("Body", body);
    b.export("Parts", parts);

    let project = "\
game=SA2B

[Body]
type=basicmodel
filename=Body.sa1mdl

[Parts]
type=modelsarray
length=4
filename=Parts
filename3=Lid
";
    let fx = Fixture::new(b.build(), project);
    let summary = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap();

    assert!(!fx.output("Parts/000.sa1mdl").exists());
    assert!(!fx.output("Parts/001.sa1mdl").exists());
    assert!(fx.output("Parts/002.sa1mdl").is_file());
    assert!(fx.output("Parts/Lid.sa1mdl").is_file());

    let manifest = read_manifest(&summary.manifest_path);
    assert_eq!(
        item_labels(&manifest, "Parts"),
        vec![
            (Some(0), label("attach", shared)),
            (Some(2), label("attach", spare)),
            (Some(3), label("attach", lid)),
        ]
    );
    assert_eq!(manifest.files["Parts/002.sa1mdl"].file_type, "basicmodel");
    assert_eq!(manifest.files["Parts/Lid.sa1mdl"].file_type, "basicmodel");
    assert_eq!(manifest.files.len(), 3);
}

#[test]
fn chunk_attach_follows_the_attach_label() {
    let mut b = ImageBuilder::new();
    let poly = b.chunk_attach();
    let loose = b.chunk_attach();
    let body = b.object(None, None);
    b.set_attach(body, poly);
    b.export("Body", body);
    b.export("Poly", poly);
    b.export("Loose", loose);

    let project = "\
game=SA2B

[Body]
type=model
filename=Body.sa2mdl

[Poly]
type=chunkattach
filename=Poly.sa2mdl

[Loose]
type=chunkattach
filename=Loose.sa2mdl
";
    let fx = Fixture::new(b.build(), project);
    let summary = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap();

    assert!(!fx.output("Poly.sa2mdl").exists());
    let manifest = read_manifest(&summary.manifest_path);
    assert_eq!(manifest.files["Loose.sa2mdl"].file_type, "chunkmodel");
    assert_eq!(manifest.files["Body.sa2mdl"].file_type, "chunkmodel");
    assert_eq!(summary.models_emitted, 2);

    let loose_file = ModelFile::read(&fs::read(fx.output("Loose.sa2mdl")).unwrap()).unwrap();
    assert_eq!(loose_file.model.attaches[0].label(), label("attach", loose));
    assert_eq!(loose_file.description.as_deref(), Some("Loose"));
}

use std::fs;

use dllsplit::{SplitOptions, Splitter};

use crate::common::{read_manifest, Fixture, ImageBuilder, IMAGE_BASE};

#[test]
fn texlist_is_registered_and_written() {
    let mut b = ImageBuilder::new();
    let stage = b.texlist(&["grass", "rock"]);
    let unnamed = b.texlist(&["sky"]);
    b.export("StageTex", stage);
    b.export("SkyTex", unnamed);

    let project = "\
game=SADX

[StageTex]
type=texlist
filename=Textures/Stage

[SkyTex]
type=texlist
";
    let fx = Fixture::new(b.build(), project);
    let summary = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap();

    assert_eq!(
        fs::read_to_string(fx.output("Textures/Stage.txt")).unwrap(),
        "grass\nrock\n"
    );
    let manifest = read_manifest(&summary.manifest_path);
    assert_eq!(manifest.files["Textures/Stage.txt"].file_type, "texlist");
    assert_eq!(manifest.files.len(), 1);

    let stage_entry = &manifest.texlists[&(IMAGE_BASE + stage)];
    assert_eq!(stage_entry.export, "StageTex");
    assert_eq!(stage_entry.index, None);
    assert_eq!(manifest.texlists[&(IMAGE_BASE + unnamed)].export, "SkyTex");
}

#[test]
fn first_claim_of_a_texlist_address_wins() {
    let mut b = ImageBuilder::new();
    let shared = b.texlist(&["a"]);
    let other = b.texlist(&["b"]);
    let lists = b.pointer_array(&[Some(other), None, Some(shared)]);
    b.export("Shared", shared);
    b.export("Lists", lists);

    let project = "\
game=SA2B

[Shared]
type=texlist

[Lists]
type=texlistarray
length=3
filename=Tex
";
    let fx = Fixture::new(b.build(), project);
    let summary = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap();
    let manifest = read_manifest(&summary.manifest_path);

    assert_eq!(manifest.texlists.len(), 2);
    assert_eq!(manifest.texlists[&(IMAGE_BASE + shared)].export, "Shared");
    let other_entry = &manifest.texlists[&(IMAGE_BASE + other)];
    assert_eq!(other_entry.export, "Lists");
    assert_eq!(other_entry.index, Some(0));

    assert!(fx.output("Tex/000.txt").is_file());
    assert!(fx.output("Tex/002.txt").is_file());
    assert!(!fx.output("Tex/001.txt").exists());

    let text = fs::read_to_string(&summary.manifest_path).unwrap();
    assert!(text.contains(&format!("{:08X}=Lists,0", IMAGE_BASE + other)));
}

use std::fs;

use dllsplit::assets::LandTableFile;
use dllsplit::ninja::LandTableFormat;
use dllsplit::{SplitOptions, Splitter};

use crate::common::{label, read_manifest, Fixture, ImageBuilder};

#[test]
fn level_table_array_skips_emitted_and_null_entries() {
    let mut b = ImageBuilder::new();
    let stage = b.landtable(false);
    let boss = b.landtable(false);
    let stages = b.pointer_array(&[Some(stage), None, Some(boss)]);
    b.export("Stage", stage);
    b.export("Stages", stages);

    let project = "\
game=SADX

[Stage]
type=landtable
filename=Levels/Stage.sa1lvl

[Stages]
type=landtablearray
length=3
filename=Levels
";
    let fx = Fixture::new(b.build(), project);
    let summary = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap();

    assert!(fx.output("Levels/Stage.sa1lvl").is_file());
    assert!(!fx.output("Levels/0.sa1lvl").exists());
    assert!(!fx.output("Levels/1.sa1lvl").exists());
    assert!(fx.output("Levels/2.sa1lvl").is_file());

    let manifest = read_manifest(&summary.manifest_path);
    let keys: Vec<&str> = manifest.files.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Levels/2.sa1lvl", "Levels/Stage.sa1lvl"]);
    assert!(manifest.files.values().all(|f| f.file_type == "landtable"));

    let array_items: Vec<(Option<usize>, &str)> = manifest
        .items
        .iter()
        .filter(|i| i.export == "Stages")
        .map(|i| (i.index, i.label.as_str()))
        .collect();
    let stage_label = label("landtable", stage);
    let boss_label = label("landtable", boss);
    assert_eq!(
        array_items,
        vec![(Some(0), stage_label.as_str()), (Some(2), boss_label.as_str())]
    );

    let written = LandTableFile::read(&fs::read(fx.output("Levels/2.sa1lvl")).unwrap()).unwrap();
    assert_eq!(written.land.format, LandTableFormat::Sadx);
    assert_eq!(written.land.label, boss_label);
    assert_eq!(written.land.far_clip, -3000.0);
    assert_eq!(written.description.as_deref(), Some("Stages[2]"));
}

#[test]
fn battle_level_table_claims_its_label() {
    let mut b = ImageBuilder::new();
    let battle = b.landtable(true);
    b.export("Battle", battle);
    b.export("BattleAlias", battle);

    let project = "\
game=SA2B

[Battle]
type=battlelandtable
filename=Battle.sa2blvl

[BattleAlias]
type=landtable
filename=Alias.sa2lvl
";
    let fx = Fixture::new(b.build(), project);
    let summary = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap();

    let written = LandTableFile::read(&fs::read(fx.output("Battle.sa2blvl")).unwrap()).unwrap();
    assert_eq!(written.land.format, LandTableFormat::Sa2b);
    assert_eq!(written.land.far_clip, -3000.0);
    assert!(!fx.output("Alias.sa2lvl").exists());

    let manifest = read_manifest(&summary.manifest_path);
    assert_eq!(manifest.files.len(), 1);
    let alias = manifest
        .items
        .iter()
        .find(|i| i.export == "BattleAlias")
        .unwrap();
    assert_eq!(alias.label, label("landtable", battle));
    assert_eq!(alias.index, None);
}

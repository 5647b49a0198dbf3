use std::fs;

use dllsplit::cancel::CancelToken;
use dllsplit::io::IOLimits;
use dllsplit::{ErrorKind, SplitError, SplitOptions, Splitter};

use crate::common::{read_manifest, Fixture, ImageBuilder};

fn one_motion() -> Vec<u8> {
    let mut b = ImageBuilder::new();
    let motion = b.motion(8);
    b.export("Walk", motion);
    b.build()
}

#[test]
fn unknown_export_names_the_symbol() {
    let fx = Fixture::new(one_motion(), "game=SA2B\n\n[Missing]\ntype=motion\nnodecount=1\n");
    let err = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap_err();
    assert!(matches!(err, SplitError::UnknownExport(ref name) if name == "Missing"));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn motion_without_nodecount_is_rejected() {
    let fx = Fixture::new(
        one_motion(),
        "game=SA2B\n\n[Walk]\ntype=motion\nfilename=Walk.saanim\n",
    );
    let err = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap_err();
    match err {
        SplitError::MissingProperty { export, property } => {
            assert_eq!(export, "Walk");
            assert_eq!(property, "nodecount");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn garbage_image_is_structural() {
    let fx = Fixture::new(b"definitely not a dll".to_vec(), "game=SA2B\n");
    let err = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
}

#[test]
fn oversized_image_is_an_input_error() {
    let fx = Fixture::new(one_motion(), "game=SA2B\n");
    let err = Splitter::new(SplitOptions {
        io_limits: IOLimits { max_file_size: 16 },
        ..Default::default()
    })
    .run(&fx.image, &fx.project, &fx.out)
    .unwrap_err();
    assert!(matches!(err, SplitError::Input(_)));
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn project_without_game_is_a_configuration_error() {
    let fx = Fixture::new(one_motion(), "name=nogame\n");
    let err = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap_err();
    assert!(matches!(err, SplitError::Config(_)));
}

#[test]
fn unknown_directive_type_is_skipped() {
    let fx = Fixture::new(
        one_motion(),
        "game=SA2B\n\n[Walk]\ntype=somethingnew\nfilename=Walk.bin\n",
    );
    let summary = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap();
    assert_eq!(summary.items, 1);
    assert_eq!(summary.files_written, 0);
    assert!(!fx.output("Walk.bin").exists());

    let manifest = read_manifest(&summary.manifest_path);
    assert_eq!(
        manifest.exports,
        vec![("Walk".to_string(), "somethingnew".to_string())]
    );
    assert!(manifest.files.is_empty());
}

#[test]
fn cancelled_run_stops_before_the_first_directive() {
    let fx = Fixture::new(
        one_motion(),
        "game=SA2B\n\n[Walk]\ntype=motion\nnodecount=1\nfilename=Walk.saanim\n",
    );
    let token = CancelToken::new();
    token.cancel();
    let err = Splitter::new(SplitOptions::default())
        .with_cancel_token(token)
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap_err();
    assert!(matches!(err, SplitError::Cancelled { completed: 0 }));
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(!fx.output("Walk.saanim").exists());
    assert!(!fx.output("chr_data.ini").exists());
}

#[test]
fn failed_directive_leaves_earlier_files_in_place() {
    let mut b = ImageBuilder::new();
    let motion = b.motion(8);
    b.export("Walk", motion);
    let fx = Fixture::new(
        b.build(),
        "game=SA2B\n\n[Walk]\ntype=motion\nnodecount=1\nfilename=Walk.saanim\n\n[Gone]\ntype=motion\nnodecount=1\n",
    );
    let err = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap_err();
    assert!(matches!(err, SplitError::UnknownExport(_)));
    assert!(fs::metadata(fx.output("Walk.saanim")).unwrap().len() > 0);
    assert!(!fx.output("chr_data.ini").exists());
}

#[test]
fn array_length_past_the_image_is_rejected() {
    let mut b = ImageBuilder::new();
    let root = b.object(None, None);
    let parts = b.pointer_array(&[Some(root)]);
    b.export("Parts", parts);
    let image = b.build();

    for length in ["1152921504606846975", "18446744073709551615", "100000"] {
        let project = format!(
            "game=SA2B\n\n[Parts]\ntype=chunkmodelarray\nlength={}\nfilename=Parts\n",
            length
        );
        let fx = Fixture::new(image.clone(), &project);
        let err = Splitter::new(SplitOptions::default())
            .run(&fx.image, &fx.project, &fx.out)
            .unwrap_err();
        match &err {
            SplitError::InvalidProperty { export, property, value } => {
                assert_eq!(export, "Parts");
                assert_eq!(property, "length");
                assert_eq!(value, length);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!fx.output("Parts").exists());
    }
}

#[test]
fn table_length_past_the_image_is_rejected() {
    let mut b = ImageBuilder::new();
    let motion = b.motion(8);
    let rows = b.alloc(0x1C);
    b.put_ptr(rows, motion);
    b.export("Table", rows);
    let fx = Fixture::new(
        b.build(),
        "game=SA2B\n\n[Table]\ntype=motiontable\nlength=4611686018427387904\nnodecount=1\nfilename=Table\n",
    );
    let err = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap_err();
    assert!(matches!(
        err,
        SplitError::InvalidProperty { ref property, .. } if property == "length"
    ));
    assert!(!fx.output("Table/info.ini").exists());
}

#[test]
fn character_table_longer_than_the_roster_is_rejected() {
    let mut b = ImageBuilder::new();
    let entry = b.alloc(60);
    b.export("Chars", entry);
    let fx = Fixture::new(
        b.build(),
        "game=SA2B\n\n[Chars]\ntype=charaobjectdatalist\nlength=16\nfilename=Chars\n",
    );
    let err = Splitter::new(SplitOptions::default())
        .run(&fx.image, &fx.project, &fx.out)
        .unwrap_err();
    assert!(matches!(
        err,
        SplitError::InvalidProperty { ref property, .. } if property == "length"
    ));
}

use insta::assert_snapshot;

#[test]
fn plain_report_shape() {
    let rendered = "src: 42 steps (3 files)
Total: 42 steps across 3 files";
    assert_snapshot!("plain_report_shape", rendered);
}

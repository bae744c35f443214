use indoc::indoc;
use std::fs;
use std::process::Command;

const RUTH: &str = indoc! {r#"
    <osis xmlns="http://www.bibletechnologies.net/2003/OSIS/namespace">
      <osisText>
        <div type="book" osisID="Ruth">
          <chapter osisID="Ruth.1">
            <verse osisID="Ruth.1.1">
              <w lemma="c/1961" morph="HC/Vqw3ms">וַֽ/יְהִ֗י</w>
              <w lemma="b/3117" morph="HR/Ncmpc">בִּ/ימֵי֙</w>
            </verse>
          </chapter>
        </div>
      </osisText>
    </osis>
"#};

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_morphhb-hapax"))
}

#[test]
fn extract_then_report() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Ruth.xml"), RUTH).unwrap();
    fs::write(
        dir.path().join("books.yaml"),
        "books:\n  - label: Ruth\n    file: Ruth.xml\n",
    )
    .unwrap();
    let csv_path = dir.path().join("out.csv");
    let tex_path = dir.path().join("ruth.tex");

    let status = binary()
        .arg("--quiet")
        .arg("extract")
        .arg(dir.path())
        .arg("--output")
        .arg(&csv_path)
        .status()
        .expect("failed to run extract");
    assert!(status.success());

    let csv = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("Ruth.1.1,c/1961,1961,וַֽ/יְהִ֗י,HC/Vqw3ms,{'HC/Vqw3ms': 'Unknown'},Yes,Yes"));

    let status = binary()
        .arg("report")
        .arg(&csv_path)
        .arg("--prefix")
        .arg("Ruth.1.")
        .arg("--title")
        .arg("Ruth Chapter 1")
        .arg("--tex")
        .arg(&tex_path)
        .status()
        .expect("failed to run report");
    assert!(status.success());

    let latex = fs::read_to_string(&tex_path).unwrap();
    assert!(latex.contains("\\section*{Ruth Chapter 1}"));
    assert!(latex.contains("בִּ/ימֵי֙"));
}

#[test]
fn unreadable_book_map_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = binary()
        .arg("extract")
        .arg(dir.path())
        .arg("--books")
        .arg(dir.path().join("missing.yaml"))
        .output()
        .expect("failed to run extract");
    assert!(!output.status.success());
}

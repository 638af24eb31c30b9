/*!
 * Tests for positional line alignment
 */

use eduart_aligner::aligner::{align, align_lines, normalize_lines, AlignedRecord};

use crate::common::{ENGLISH_SCRIPT, KOREAN_SCRIPT};

/// Inputs covering equal, uneven, blank and empty texts
fn sample_pairs() -> Vec<(&'static str, &'static str)> {
    vec![
        ("", ""),
        ("a", ""),
        ("", "x\ny"),
        ("a\n\n  \nb", "x\ny"),
        ("one\r\ntwo\r\nthree", "uno"),
        ("\t\n\n", "  only  "),
        (KOREAN_SCRIPT, ENGLISH_SCRIPT),
        ("1\n2\n3\n4\n5\n6", "a\n\nb\n\n\nc"),
    ]
}

#[test]
fn test_align_scenarioA_shouldPairKoreanWithEnglish() {
    let result = align("안녕\n반가워", "Hi\nNice to meet you");
    assert_eq!(
        result,
        vec![
            AlignedRecord::new(1, "안녕", "Hi"),
            AlignedRecord::new(2, "반가워", "Nice to meet you"),
        ]
    );
}

#[test]
fn test_align_scenarioB_shouldPadMissingTarget() {
    assert_eq!(align("한줄", ""), vec![AlignedRecord::new(1, "한줄", "")]);
}

#[test]
fn test_align_scenarioC_shouldBeEmpty() {
    assert_eq!(align("", ""), Vec::<AlignedRecord>::new());
}

#[test]
fn test_align_scenarioD_shouldIgnoreBlankLines() {
    assert_eq!(
        align("a\n\n  \nb", "x\ny"),
        vec![AlignedRecord::new(1, "a", "x"), AlignedRecord::new(2, "b", "y")]
    );
}

#[test]
fn test_align_length_shouldEqualLongerSide() {
    for (source, target) in sample_pairs() {
        let expected = normalize_lines(source).len().max(normalize_lines(target).len());
        assert_eq!(align(source, target).len(), expected, "inputs: {:?} / {:?}", source, target);
    }
}

#[test]
fn test_align_ids_shouldRunFromOneWithoutGaps() {
    for (source, target) in sample_pairs() {
        let ids: Vec<usize> = align(source, target).iter().map(|r| r.id).collect();
        let expected: Vec<usize> = (1..=ids.len()).collect();
        assert_eq!(ids, expected);
    }
}

#[test]
fn test_align_pairedPrefix_shouldMatchNormalizedLines() {
    for (source, target) in sample_pairs() {
        let source_lines = normalize_lines(source);
        let target_lines = normalize_lines(target);
        let result = align(source, target);

        for (i, record) in result.iter().enumerate() {
            match source_lines.get(i) {
                Some(line) => assert_eq!(&record.source, line),
                None => assert_eq!(record.source, ""),
            }
            match target_lines.get(i) {
                Some(line) => assert_eq!(&record.target, line),
                None => assert_eq!(record.target, ""),
            }
        }
    }
}

#[test]
fn test_align_realignment_shouldReproduceSameResult() {
    for (source, target) in sample_pairs() {
        let first = align(source, target);
        let rejoined_source = normalize_lines(source).join("\n");
        let rejoined_target = normalize_lines(target).join("\n");
        assert_eq!(align(&rejoined_source, &rejoined_target), first);
    }
}

#[test]
fn test_align_sampleScripts_shouldPairEverySentence() {
    let result = align(KOREAN_SCRIPT, ENGLISH_SCRIPT);
    assert_eq!(result.len(), 3);
    assert_eq!(result[2], AlignedRecord::new(3, "산책하러 갈까요?", "Shall we go for a walk?"));
    assert!(result.iter().all(|r| r.is_paired()));
}

#[test]
fn test_alignLines_withEmptySides_shouldBeEmpty() {
    let none: [&str; 0] = [];
    assert!(align_lines(&none, &none).is_empty());
    assert_eq!(align_lines(&none, &["x"]), vec![AlignedRecord::new(1, "", "x")]);
}

#[test]
fn test_align_isDeterministic() {
    assert_eq!(align(KOREAN_SCRIPT, ENGLISH_SCRIPT), align(KOREAN_SCRIPT, ENGLISH_SCRIPT));
}

use super::*;

fn results_page(rows: &[(&str, &str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(title, new_price, used_price)| {
            format!(
                r#"<tr>
                    <td class="title"><a href="/game/x">{title}</a></td>
                    <td class="new_price">{new_price}</td>
                    <td class="used_price">{used_price}</td>
                </tr>"#
            )
        })
        .collect();
    format!(r#"<html><body><table id="games_table"><tbody>{body}</tbody></table></body></html>"#)
}

#[test]
fn picks_first_international_row_by_default() {
    let html = results_page(&[
        ("Jolteon ex Japanese #209", "$40.00", "$35.00"),
        ("Jolteon ex #209", "$62.00", "$55.00"),
    ]);
    let candidates = extract_search_results(&html, false);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].amount, 62.0);
    assert!(candidates[0].matched_text.contains("Jolteon ex #209"));
}

#[test]
fn prefers_japanese_row_for_japanese_prints() {
    let html = results_page(&[
        ("Jolteon ex #209", "$62.00", "$55.00"),
        ("Jolteon ex Japanese #209", "$40.00", "$35.00"),
    ]);
    let candidates = extract_search_results(&html, true);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].amount, 40.0);
}

#[test]
fn falls_back_to_first_row_when_no_print_matches() {
    let html = results_page(&[("Jolteon ex #209", "$62.00", "$55.00")]);
    let candidates = extract_search_results(&html, true);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].amount, 62.0);
}

#[test]
fn uses_used_price_when_new_price_missing() {
    let html = results_page(&[("Jolteon ex #209", "", "$47.50")]);
    let candidates = extract_search_results(&html, false);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].amount, 47.5);
}

#[test]
fn graded_column_becomes_a_graded_candidate() {
    let html = r#"<html><body><table id="games_table"><tbody>
        <tr>
            <td class="title"><a href="/game/x">Jolteon ex #209</a></td>
            <td class="new_price">$62.00</td>
            <td class="used_price">$55.00</td>
            <td class="manual_only_price">$180.00</td>
        </tr>
    </tbody></table></body></html>"#;

    let candidates = extract_search_results(html, false);
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].tier, ConditionTier::Ungraded);
    assert_eq!(candidates[0].amount, 62.0);
    assert_eq!(candidates[1].tier, ConditionTier::GradedTop);
    assert_eq!(candidates[1].amount, 180.0);
}

#[test]
fn empty_table_yields_no_candidates() {
    let html = r#"<html><body><table id="games_table"><tbody></tbody></table></body></html>"#;
    assert!(extract_search_results(html, false).is_empty());
}

#[test]
fn corrupted_price_above_ceiling_is_dropped() {
    let html = results_page(&[("Jolteon ex #209", "$2,500,000.00", "")]);
    assert!(extract_search_results(&html, false).is_empty());
}

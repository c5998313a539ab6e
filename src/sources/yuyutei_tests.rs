use super::*;

struct Tile {
    title: &'static str,
    number: &'static str,
    alt: &'static str,
    price: &'static str,
}

fn buylist_page(tiles: &[Tile]) -> String {
    let body: String = tiles
        .iter()
        .map(|t| {
            format!(
                r##"<div class="card-product position-relative">
                    <a href="#"><h4 class="text-primary fw-bold">{}</h4></a>
                    <span class="border border-dark">{}</span>
                    <img class="card" alt="{}" src="x.jpg">
                    <strong class="d-block text-end">{}</strong>
                </div>"##,
                t.title, t.number, t.alt, t.price
            )
        })
        .collect();
    format!("<html><body>{body}</body></html>")
}

fn jolteon_tile(price: &'static str) -> Tile {
    Tile {
        title: "サンダースex",
        number: "209/190",
        alt: "209/190 SAR サンダースex",
        price,
    }
}

#[test]
fn extracts_matching_buylist_offer() {
    let html = buylist_page(&[jolteon_tile("12,800円")]);
    let candidates = extract_buylist(&html, "サンダースex", "SAR");
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].amount, 12800.0);
    assert_eq!(candidates[0].source, SourceId::Yuyutei);
}

#[test]
fn rejects_unrelated_card_names() {
    let html = buylist_page(&[Tile {
        title: "リーフィアVSTAR",
        number: "211/172",
        alt: "211/172 SAR リーフィアVSTAR",
        price: "9,800円",
    }]);
    assert!(extract_buylist(&html, "サンダースex", "SAR").is_empty());
}

#[test]
fn rarity_contradiction_excludes_tile() {
    let html = buylist_page(&[Tile {
        title: "サンダースex",
        number: "069/071",
        alt: "069/071 RR サンダースex",
        price: "380円",
    }]);
    // An RR-labeled tile must never aggregate under a SAR target
    assert!(extract_buylist(&html, "サンダースex", "SAR").is_empty());
}

#[test]
fn rarity_absent_is_soft_accepted() {
    let html = buylist_page(&[Tile {
        title: "サンダースex",
        number: "209/190",
        alt: "",
        price: "11,000円",
    }]);
    let candidates = extract_buylist(&html, "サンダースex", "SAR");
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].amount, 11000.0);
}

#[test]
fn cheap_sar_offers_hit_the_rarity_floor() {
    // "80 yen problem": accessory rows priced far below any real SAR
    let html = buylist_page(&[jolteon_tile("80円")]);
    assert!(extract_buylist(&html, "サンダースex", "SAR").is_empty());
}

#[test]
fn floor_does_not_apply_without_high_value_rarity() {
    let html = buylist_page(&[Tile {
        title: "サンダースex",
        number: "069/071",
        alt: "069/071 RR サンダースex",
        price: "380円",
    }]);
    let candidates = extract_buylist(&html, "サンダースex", "RR");
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].amount, 380.0);
}

#[test]
fn multiple_offers_all_survive() {
    let html = buylist_page(&[jolteon_tile("12,800円"), jolteon_tile("13,500円")]);
    let candidates = extract_buylist(&html, "サンダースex", "SAR");
    assert_eq!(candidates.len(), 2);
}

#[test]
fn tiles_without_prices_are_skipped() {
    let html = buylist_page(&[Tile {
        title: "サンダースex",
        number: "209/190",
        alt: "209/190 SAR",
        price: "売切",
    }]);
    assert!(extract_buylist(&html, "サンダースex", "SAR").is_empty());
}

#[test]
fn empty_page_yields_no_candidates() {
    assert!(extract_buylist("<html><body></body></html>", "サンダースex", "SAR").is_empty());
}

#[test]
fn short_target_name_skips_prefix_check() {
    let html = buylist_page(&[Tile {
        title: "ピカチュウ",
        number: "001/071",
        alt: "",
        price: "1,200円",
    }]);
    // Two-char target: prefix check disabled, tile survives on rarity alone
    let candidates = extract_buylist(&html, "ピカ", "");
    assert_eq!(candidates.len(), 1);
}

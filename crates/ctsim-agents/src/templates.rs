//! Deterministic tweet templates keyed by archetype.
//!
//! These fill in for any persona the model capability did not produce a
//! usable tweet for. Every template carries a fixed sentiment tag and
//! references the token's ticker; reply and quote templates also name the
//! author of the tweet being answered.

use ctsim_types::{InteractionKind, PersonaType};
use rand::Rng;
use rand::seq::IndexedRandom;

/// One weighted template line.
#[derive(Debug, Clone, Copy)]
struct Template {
    text: &'static str,
    sentiment: f64,
    weight: u32,
}

const fn t(text: &'static str, sentiment: f64, weight: u32) -> Template {
    Template {
        text,
        sentiment,
        weight,
    }
}

// ---------------------------------------------------------------------------
// Original posts
// ---------------------------------------------------------------------------

const DEGEN: &[Template] = &[
    t("${ticker} looks interesting, aped a smol bag LFG 🚀", 0.7, 3),
    t("ser this ${ticker} chart is doing things to me", 0.5, 2),
    t("${ticker}??? say less, I'm in", 0.8, 3),
];

const SKEPTIC: &[Template] = &[
    t("${ticker} - anon team, no audit, unlocked LP. Classic rug setup.", -0.8, 3),
    t("Why would anyone buy ${ticker}? Genuine question.", -0.5, 2),
    t("${ticker} holders are exit liquidity. DYOR.", -0.7, 2),
];

const WHALE: &[Template] = &[
    t("${ticker}", 0.3, 2),
    t("${ticker}. interesting", 0.4, 2),
    t("watching ${ticker}.", 0.2, 1),
];

const INFLUENCER: &[Template] = &[
    t("Just found ${ticker} - this could be big. Early alpha for my followers 👀", 0.8, 3),
    t("${ticker} thread coming soon. You're not ready.", 0.6, 2),
    t("CT is sleeping on ${ticker}. Don't say I didn't warn you.", 0.7, 2),
];

const NORMIE: &[Template] = &[
    t("Is ${ticker} legit? Should I buy?", 0.2, 3),
    t("Just bought some ${ticker}, hope this moons!", 0.5, 2),
    t("What's the deal with ${ticker}?", 0.0, 2),
];

const KOL: &[Template] = &[
    t("Been tracking ${ticker} since launch. Distribution looks clean so far.", 0.6, 2),
    t("${ticker} has the mindshare. Whether it has legs is another question.", 0.2, 2),
    t("Not touching ${ticker} until I see the wallets. Too many fresh ones.", -0.4, 1),
];

// ---------------------------------------------------------------------------
// Replies and quotes
// ---------------------------------------------------------------------------

const DEGEN_REPLY: &[Template] = &[
    t("@{author} ser you're early, ${ticker} is going parabolic", 0.8, 3),
    t("@{author} aped ${ticker} because of this tweet, don't let me down", 0.6, 2),
];

const SKEPTIC_REPLY: &[Template] = &[
    t("@{author} imagine shilling ${ticker} with an unlocked LP", -0.8, 3),
    t("@{author} how much did ${ticker} pay you for this?", -0.6, 2),
];

const WHALE_REPLY: &[Template] = &[t("@{author} ${ticker}. noted.", 0.3, 1)];

const INFLUENCER_REPLY: &[Template] = &[
    t("@{author} told my followers about ${ticker} hours ago 👀", 0.7, 2),
    t("@{author} ${ticker} is exactly the play I've been talking about", 0.6, 2),
];

const NORMIE_REPLY: &[Template] = &[
    t("@{author} wait is ${ticker} actually good? how do I buy", 0.3, 3),
    t("@{author} should I sell my ${ticker} or hold??", -0.1, 2),
];

const BOT_REPLY: &[Template] = &[t("@{author} ${ticker} alert: volume spike detected", 0.0, 1)];

const KOL_REPLY: &[Template] = &[
    t("@{author} ${ticker} flows say otherwise. Check the deployer.", -0.4, 2),
    t("@{author} agree on ${ticker}, the narrative fits this market", 0.5, 2),
];

const DEGEN_QUOTE: &[Template] = &[
    t("this. ${ticker} is the one. LFG 🚀", 0.8, 3),
    t("@{author} gets it. loading more ${ticker}", 0.7, 2),
];

const SKEPTIC_QUOTE: &[Template] = &[
    t("Saving this for when ${ticker} rugs. Screenshot it.", -0.8, 3),
    t("@{author} is exit liquidity for ${ticker} insiders and doesn't know it", -0.7, 2),
];

const WHALE_QUOTE: &[Template] = &[t("${ticker}. hmm", 0.2, 1)];

const INFLUENCER_QUOTE: &[Template] = &[
    t("Called ${ticker} before @{author}. Still early though.", 0.7, 2),
    t("${ticker} is trending for a reason. Don't fade this.", 0.6, 2),
];

const NORMIE_QUOTE: &[Template] = &[t("everyone keeps posting ${ticker}, am I late?", 0.3, 1)];

const BOT_QUOTE: &[Template] = &[t("🚨 ${ticker} mentioned by @{author}", 0.0, 1)];

const KOL_QUOTE: &[Template] = &[
    t("Good read on ${ticker} from @{author}. Sizing in slowly.", 0.5, 2),
    t("Respectfully, ${ticker} is a liquidity trap. @{author} will learn.", -0.5, 1),
];

const fn originals(kind: PersonaType) -> &'static [Template] {
    match kind {
        PersonaType::Degen => DEGEN,
        PersonaType::Skeptic => SKEPTIC,
        PersonaType::Whale => WHALE,
        PersonaType::Influencer => INFLUENCER,
        PersonaType::Normie => NORMIE,
        // Bot alerts carry randomized stats and are rendered separately.
        PersonaType::Bot => &[],
        PersonaType::Kol => KOL,
    }
}

const fn replies(kind: PersonaType) -> &'static [Template] {
    match kind {
        PersonaType::Degen => DEGEN_REPLY,
        PersonaType::Skeptic => SKEPTIC_REPLY,
        PersonaType::Whale => WHALE_REPLY,
        PersonaType::Influencer => INFLUENCER_REPLY,
        PersonaType::Normie => NORMIE_REPLY,
        PersonaType::Bot => BOT_REPLY,
        PersonaType::Kol => KOL_REPLY,
    }
}

const fn quotes(kind: PersonaType) -> &'static [Template] {
    match kind {
        PersonaType::Degen => DEGEN_QUOTE,
        PersonaType::Skeptic => SKEPTIC_QUOTE,
        PersonaType::Whale => WHALE_QUOTE,
        PersonaType::Influencer => INFLUENCER_QUOTE,
        PersonaType::Normie => NORMIE_QUOTE,
        PersonaType::Bot => BOT_QUOTE,
        PersonaType::Kol => KOL_QUOTE,
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render<R: Rng + ?Sized>(
    pool: &[Template],
    ticker: &str,
    author: &str,
    rng: &mut R,
) -> (String, f64) {
    pool.choose_weighted(rng, |tpl| tpl.weight).map_or_else(
        |_| (format!("${ticker}"), 0.0),
        |tpl| {
            let text = tpl
                .text
                .replace("{ticker}", ticker)
                .replace("{author}", author);
            (text, tpl.sentiment)
        },
    )
}

/// The bot alert used as the seed tweet of every run.
pub fn bot_alert<R: Rng + ?Sized>(ticker: &str, rng: &mut R) -> String {
    let holders = rng.random_range(50..=500_u32);
    let volume_k = rng.random_range(10..=100_u32);
    format!("🚨 NEW TOKEN: ${ticker}\nHolders: {holders}\nVol: ${volume_k}K")
}

/// A fallback original post for an archetype.
pub fn original<R: Rng + ?Sized>(kind: PersonaType, ticker: &str, rng: &mut R) -> (String, f64) {
    if kind == PersonaType::Bot {
        return (bot_alert(ticker, rng), 0.0);
    }
    render(originals(kind), ticker, "", rng)
}

/// A fallback reply or quote aimed at the tweet by `target_handle`.
///
/// [`InteractionKind::Original`] renders a plain original post.
pub fn interaction<R: Rng + ?Sized>(
    kind: PersonaType,
    interaction: InteractionKind,
    ticker: &str,
    target_handle: &str,
    rng: &mut R,
) -> (String, f64) {
    match interaction {
        InteractionKind::Reply => render(replies(kind), ticker, target_handle, rng),
        InteractionKind::Quote => render(quotes(kind), ticker, target_handle, rng),
        InteractionKind::Original => original(kind, ticker, rng),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    const ALL_KINDS: [PersonaType; 7] = [
        PersonaType::Degen,
        PersonaType::Skeptic,
        PersonaType::Whale,
        PersonaType::Influencer,
        PersonaType::Normie,
        PersonaType::Bot,
        PersonaType::Kol,
    ];

    #[test]
    fn every_original_references_the_ticker() {
        let mut rng = SmallRng::seed_from_u64(42);
        for kind in ALL_KINDS {
            for _ in 0..20 {
                let (text, sentiment) = original(kind, "FROG", &mut rng);
                assert!(text.contains("$FROG"), "{kind}: {text}");
                assert!((-1.0..=1.0).contains(&sentiment));
            }
        }
    }

    #[test]
    fn interactions_reference_ticker_and_stay_in_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        for kind in ALL_KINDS {
            for interaction_kind in [InteractionKind::Reply, InteractionKind::Quote] {
                for _ in 0..10 {
                    let (text, sentiment) =
                        interaction(kind, interaction_kind, "FROG", "someone", &mut rng);
                    assert!(text.contains("$FROG"), "{kind}: {text}");
                    assert!(!text.contains("{author}"));
                    assert!((-1.0..=1.0).contains(&sentiment));
                }
            }
        }
    }

    #[test]
    fn skeptic_originals_are_negative() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..20 {
            let (_, sentiment) = original(PersonaType::Skeptic, "RUG", &mut rng);
            assert!(sentiment < 0.0);
        }
    }

    #[test]
    fn replies_name_the_target() {
        let mut rng = SmallRng::seed_from_u64(11);
        let (text, _) = interaction(
            PersonaType::Normie,
            InteractionKind::Reply,
            "FROG",
            "0xWhale_",
            &mut rng,
        );
        assert!(text.starts_with("@0xWhale_ "));
    }

    #[test]
    fn bot_alert_has_stats_in_range() {
        let mut rng = SmallRng::seed_from_u64(5);
        let alert = bot_alert("FROG", &mut rng);
        assert!(alert.starts_with("🚨 NEW TOKEN: $FROG\nHolders: "));
        let holders: u32 = alert
            .lines()
            .nth(1)
            .and_then(|l| l.strip_prefix("Holders: "))
            .and_then(|n| n.parse().ok())
            .unwrap_or_default();
        assert!((50..=500).contains(&holders));
        assert!(alert.ends_with("K"));
    }
}

//! The persona catalog.
//!
//! One persona per base archetype plus an extension set of named key
//! opinion leaders. The catalog is built once by [`PersonaRegistry::builtin`]
//! and passed by reference to every run; personas are handed out as shared
//! [`Arc`] handles so tweets can point at their author without copying.

use std::sync::Arc;

use ctsim_types::{Persona, PersonaType};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

/// Immutable persona catalog.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    /// Base archetypes in [`PersonaType::BASE`] order.
    base: [Arc<Persona>; 6],
    /// Key opinion leader extension set.
    kols: Vec<Arc<Persona>>,
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PersonaRegistry {
    /// Build the built-in catalog.
    pub fn builtin() -> Self {
        let registry = Self {
            base: [
                Arc::new(degen()),
                Arc::new(skeptic()),
                Arc::new(whale()),
                Arc::new(influencer()),
                Arc::new(normie()),
                Arc::new(bot()),
            ],
            kols: builtin_kols().into_iter().map(Arc::new).collect(),
        };
        debug!(kols = registry.kols.len(), "persona catalog built");
        registry
    }

    /// Return the persona for an archetype.
    ///
    /// For [`PersonaType::Kol`] this is the first KOL in the extension set.
    pub fn get(&self, kind: PersonaType) -> &Arc<Persona> {
        let [degen, skeptic, whale, influencer, normie, bot] = &self.base;
        match kind {
            PersonaType::Degen => degen,
            PersonaType::Skeptic => skeptic,
            PersonaType::Whale => whale,
            PersonaType::Influencer => influencer,
            PersonaType::Normie => normie,
            PersonaType::Bot => bot,
            PersonaType::Kol => self.kols.first().unwrap_or(influencer),
        }
    }

    /// Every persona in catalog order, optionally including the KOL set.
    pub fn all(&self, include_kols: bool) -> Vec<Arc<Persona>> {
        let mut all: Vec<Arc<Persona>> = self.base.iter().cloned().collect();
        if include_kols {
            all.extend(self.kols.iter().cloned());
        }
        all
    }

    /// The KOL extension set.
    pub fn kols(&self) -> &[Arc<Persona>] {
        &self.kols
    }

    /// A random subset of `n` KOLs (all of them if `n` exceeds the set).
    pub fn sample(&self, n: usize, rng: &mut (impl Rng + ?Sized)) -> Vec<Arc<Persona>> {
        self.kols.choose_multiple(rng, n).cloned().collect()
    }

    /// Base set plus `n` sampled KOLs.
    pub fn population_with_sample(&self, n: usize, rng: &mut (impl Rng + ?Sized)) -> Vec<Arc<Persona>> {
        let mut population = self.all(false);
        population.extend(self.sample(n, rng));
        population
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn persona(
    kind: PersonaType,
    name: &str,
    handle: &str,
    bio: &str,
    rates: [f64; 4],
    personality_prompt: &str,
    vocabulary: &[&str],
) -> Persona {
    let [engagement_rate, influence_score, fomo_susceptibility, fud_generation] = rates;
    Persona {
        kind,
        name: name.to_owned(),
        handle: handle.to_owned(),
        bio: bio.to_owned(),
        engagement_rate,
        influence_score,
        fomo_susceptibility,
        fud_generation,
        personality_prompt: personality_prompt.to_owned(),
        vocabulary: vocabulary.iter().map(|&v| v.to_owned()).collect(),
    }
}

fn degen() -> Persona {
    persona(
        PersonaType::Degen,
        "DegenSpartan",
        "degen_spartan_ii",
        "aped 47 rugs this week | down bad but still vibing | not financial advice",
        [0.9, 0.3, 0.95, 0.1],
        "You ape into everything. You've been rugged dozens of times but keep coming back. \
         You're optimistic to a fault, always looking for the next 100x. You use lots of emojis and slang.",
        &["ser", "aping", "LFG", "wagmi", "ngmi", "based", "100x", "smol bag", "wen moon", "gm"],
    )
}

fn skeptic() -> Persona {
    persona(
        PersonaType::Skeptic,
        "CryptoSkeptic",
        "NotYourLiquidity",
        "Calling rugs since 2017 | Your favorite project is a scam | DMs closed",
        [0.7, 0.5, 0.1, 0.9],
        "You assume every new token is a rug until proven otherwise. You look for red flags \
         obsessively: anonymous team, unlocked liquidity, copied code. You're often right but also \
         miss legitimate projects.",
        &["rug", "scam", "honeypot", "dev wallet", "unlocked", "anon team", "DYOR", "exit liquidity", "bag holders"],
    )
}

fn whale() -> Persona {
    persona(
        PersonaType::Whale,
        "0xWhale",
        "0xWhale_",
        ".",
        [0.2, 0.95, 0.3, 0.2],
        "You rarely speak but when you do, people listen. You're analytical and look for \
         asymmetric bets. You never reveal your positions directly. Your tweets are cryptic and minimal.",
        &["interesting", "watching", "hmm", "...", "noted"],
    )
}

fn influencer() -> Persona {
    persona(
        PersonaType::Influencer,
        "CryptoGems",
        "CryptoGems100x",
        "500K followers | Finding gems before they pump | DM for promos",
        [0.6, 0.8, 0.5, 0.3],
        "You shill coins that pay you or that you're already in. You hype momentum plays and \
         abandon them quickly. You care about engagement metrics and looking smart. You never admit \
         when you're wrong.",
        &["alpha", "gem", "early", "1000x potential", "NFA", "don't fade", "CT is sleeping on", "thread"],
    )
}

fn normie() -> Persona {
    persona(
        PersonaType::Normie,
        "CryptoNewbie2024",
        "JustHereForGains",
        "New to crypto | Learning as I go | Following the smart money",
        [0.4, 0.1, 0.7, 0.2],
        "You don't fully understand crypto but you're here to make money. You follow what \
         influencers say. You ask basic questions. You're easily excited and easily scared.",
        &["is this legit?", "should I buy?", "to the moon?", "wen pump", "how do I buy", "what's the CA"],
    )
}

fn bot() -> Persona {
    persona(
        PersonaType::Bot,
        "CryptoAlerts",
        "TokenAlerts_",
        "Automated token alerts | Not financial advice",
        [0.95, 0.1, 0.0, 0.0],
        "You're a bot. You post token stats and alerts. No personality, just data.",
        &["NEW TOKEN", "Volume:", "Holders:", "LP:", "24h:"],
    )
}

fn builtin_kols() -> Vec<Persona> {
    vec![
        persona(
            PersonaType::Kol,
            "ChartWizard",
            "chartwizard_eth",
            "TA is astrology for men but I'm good at it | 300K",
            [0.5, 0.85, 0.4, 0.3],
            "You post charts with lines on them and speak with total confidence. You call \
             breakouts and never mention the ones that failed.",
            &["breakout", "retest", "HTF", "bullish divergence", "invalidation", "send it"],
        ),
        persona(
            PersonaType::Kol,
            "OnchainSleuth",
            "onchain_sleuth",
            "Following the wallets so you don't have to",
            [0.45, 0.8, 0.15, 0.7],
            "You dig through wallet flows and deployer history. You expose insiders and \
             bundled supply, and you are quick to call out a farm.",
            &["deployer", "bundled", "insiders", "fresh wallets", "supply", "receipts"],
        ),
        persona(
            PersonaType::Kol,
            "MemeLord",
            "memelord_sol",
            "posting memes until one of them becomes a coin",
            [0.8, 0.7, 0.85, 0.15],
            "You live for meme culture. If the meme is good you're in, fundamentals be damned. \
             You reply fast and in all lowercase.",
            &["cult", "meme magic", "community", "vibes", "it's so over", "we're so back"],
        ),
        persona(
            PersonaType::Kol,
            "MacroMaxi",
            "macro_maxi",
            "Rates, liquidity, and the occasional shitcoin",
            [0.3, 0.9, 0.2, 0.5],
            "You frame everything through liquidity and macro. You are dismissive of small caps \
             unless the market is euphoric.",
            &["liquidity", "risk-on", "risk-off", "rotation", "cycle", "DXY"],
        ),
        persona(
            PersonaType::Kol,
            "AlphaCaller",
            "alpha_caller",
            "Calls in the group first | 150K",
            [0.7, 0.75, 0.7, 0.2],
            "You call tokens early and take credit loudly when they run. You post entries and \
             target multiples.",
            &["called it", "entry", "target", "still early", "alpha", "x's"],
        ),
        persona(
            PersonaType::Kol,
            "RugRadar",
            "rug_radar",
            "Automated paranoia, manual verification",
            [0.55, 0.65, 0.05, 0.85],
            "You check contracts and liquidity locks on every launch and post the findings \
             bluntly.",
            &["LP unlocked", "mint authority", "honeypot", "renounced", "tax", "red flag"],
        ),
        persona(
            PersonaType::Kol,
            "VCInsider",
            "vc_insider",
            "Allocations, unlocks, and hot takes",
            [0.25, 0.9, 0.35, 0.4],
            "You talk about tokens like a fund manager. You care about distribution and \
             narrative fit.",
            &["narrative", "distribution", "unlocks", "mindshare", "thesis", "conviction"],
        ),
        persona(
            PersonaType::Kol,
            "NFTDegenQueen",
            "nft_degen_queen",
            "JPEG survivor | now trading memecoins",
            [0.65, 0.6, 0.8, 0.25],
            "You bring NFT-era energy to memecoins. You love art, community, and a good bit.",
            &["art", "community", "floor", "pfp", "iykyk", "ser"],
        ),
    ]
}

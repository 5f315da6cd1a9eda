//! Message templates for hit alerts, status replies and command replies.

use alloy::primitives::{Address, U256};
use reqwest::Url;

use super::units::format_ether;
use super::{OutgoingMessage, UrlButton};
use crate::config::Links;
use crate::domain::{ContractSnapshot, HitEvent, TimeRemaining};

/// Reply after a successful `/subscribe`.
pub const SUBSCRIBED: &str = "Subscribed to VapeGame events!!";
/// Reply when `/subscribe` fails.
pub const SUBSCRIBE_FAILED: &str = "Error subscribing to VapeGame events";
/// Reply after a successful `/unsubscribe`.
pub const UNSUBSCRIBED: &str = "Unsubscribed from VapeGame events";
/// Reply when `/unsubscribe` fails.
pub const UNSUBSCRIBE_FAILED: &str = "Error unsubscribing to VapeGame events";
/// Reply when the status command cannot read the contract.
pub const STATUS_FAILED: &str = "Error fetching VapeGame stats";

const TWEET_INTENT_URL: &str = "https://twitter.com/intent/tweet";

const SHARE_FOOTER: &str = "I will also gain dividends for hits taken after me.\n\n\
                            /TAKE_THE_HIT\n\nzoomer.vape.money\n\n$ZOOMER ";

/// Alert broadcast to every subscriber for a `TookAHit` event.
///
/// `num_hits` and `game_time` come from contract reads made right after
/// the event; everything else comes from the event itself.
#[must_use]
pub fn hit_alert(event: &HitEvent, num_hits: U256, game_time: U256, links: &Links) -> OutgoingMessage {
    let hours = game_time / U256::from(3600u16);
    let text = format!(
        "<b>🌬💨 Woah, Massive Vape Alert!* 💨🌬</b>\n\
         <b>👾 Zoomer is puffin' clouds! 👾</b>\n\n\
         {taker}\
         {values}\n\
         🔋 Battery reset, another {hours} hours to go!\n",
        taker = taker_line("Hit Taken by", &event.user, links),
        values = value_lines(
            num_hits,
            event.next_hit_price,
            event.pot_value,
            event.lotto_value,
            event.total_dividends
        ),
    );

    let share = format!(
        "💨 I took a fatty $VAPE hit for {amount} ETH 💨\n\n\
         If nobody hits in {hours} hours I will win {pot} ETH and an other lucky random \
         winner will win {lotto} ETH.\n\n{SHARE_FOOTER}",
        amount = format_ether(event.amount),
        pot = format_ether(event.pot_value),
        lotto = format_ether(event.lotto_value),
    );

    with_keyboard(OutgoingMessage::html(text), &share, links)
}

/// Reply to the status command.
#[must_use]
pub fn status(snapshot: &ContractSnapshot, remaining: TimeRemaining, links: &Links) -> OutgoingMessage {
    let battery = match remaining {
        TimeRemaining::Running {
            hours,
            minutes,
            seconds,
        } => format!(
            "🔋 Battery dies in <b>{hours:02} hours {minutes:02} minutes {seconds:02} seconds!</b>\n"
        ),
        TimeRemaining::Expired => "🪫 Battery is dead! Waiting for the last hit to pay out.\n".to_string(),
    };

    let text = format!(
        "<b>🌬💨 Ong we bussin frfr! 💨🌬</b>\n\
         {taker}\
         {values}\n\
         {battery}",
        taker = taker_line("Last Hit Taken by", &snapshot.last_purchased_address, links),
        values = value_lines(
            snapshot.num_hits,
            snapshot.next_hit_price,
            snapshot.pot_value,
            snapshot.lotto_value,
            snapshot.total_dividends
        ),
    );

    let window = match remaining {
        TimeRemaining::Running { hours, .. } if hours > 0 => format!("{hours} hours"),
        TimeRemaining::Running { minutes, .. } => format!("{minutes} minutes"),
        TimeRemaining::Expired => "0 minutes".to_string(),
    };
    let share = format!(
        "💨 I took a fatty $VAPE hit 💨\n\n\
         If nobody hits in {window} I will win {pot} ETH and an other lucky random \
         winner will win {lotto} ETH.\n\n{SHARE_FOOTER}",
        pot = format_ether(snapshot.pot_value),
        lotto = format_ether(snapshot.lotto_value),
    );

    with_keyboard(OutgoingMessage::html(text), &share, links)
}

/// Hit alert filled with fixed placeholder values, for checking the
/// layout in a chat without waiting for a real event.
#[must_use]
pub fn test_alert(links: &Links) -> OutgoingMessage {
    let placeholder = HitEvent {
        user: Address::ZERO,
        amount: milli_ether(1230),
        vape_token_value: U256::ZERO,
        pot_value: milli_ether(1240),
        lotto_value: milli_ether(1250),
        total_dividends: milli_ether(1260),
        next_hit_price: milli_ether(1230),
        block_number: None,
        transaction_hash: None,
    };
    hit_alert(&placeholder, U256::ZERO, U256::from(24 * 3600u32), links)
}

fn milli_ether(milli: u64) -> U256 {
    U256::from(milli) * U256::from(1_000_000_000_000_000u64)
}

fn taker_line(label: &str, address: &Address, links: &Links) -> String {
    format!(
        "👤 {label}: <a href=\"{url}\">{address}</a>\n",
        url = links.explorer(address)
    )
}

fn value_lines(num_hits: U256, next_price: U256, pot: U256, lotto: U256, dividends: U256) -> String {
    format!(
        "🔢 Number of Hits Taken: <b>{num_hits}</b> 🔢\n\
         💸 Next Hit Price: <b>{next} ETH</b> 💸\n\
         🔥 Bussin Oil Value: <b>{pot} ETH</b> 🔥\n\
         🌟 Lucky Winner Value: <b>{lotto} ETH</b> 🌟\n\
         💧 Total Free Hits Pool: <b>{dividends} ETH</b> 💧\n",
        next = format_ether(next_price),
        pot = format_ether(pot),
        lotto = format_ether(lotto),
        dividends = format_ether(dividends),
    )
}

fn with_keyboard(message: OutgoingMessage, share_text: &str, links: &Links) -> OutgoingMessage {
    message
        .with_row(vec![
            UrlButton::new("Cmon, Take a Hit!", links.game_url.as_str()),
            UrlButton::new("Share to X", share_url(share_text)),
        ])
        .with_row(vec![UrlButton::new("Buy $ZOOMER", links.buy_url.as_str())])
        .with_row(vec![UrlButton::new("WTF is $ZOOMER??", links.info_url.as_str())])
}

fn share_url(text: &str) -> String {
    Url::parse_with_params(TWEET_INTENT_URL, &[("text", text)])
        .map_or_else(|_| TWEET_INTENT_URL.to_string(), String::from)
}

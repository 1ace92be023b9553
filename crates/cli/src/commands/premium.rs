use assurini_core::pricing::premium_breakdown;

use crate::commands::CommandResult;
use crate::PremiumArgs;

pub fn run(args: &PremiumArgs) -> CommandResult {
    let trip = args.trip.to_trip();
    if let Err(error) = trip.validate() {
        return CommandResult::failure("premium", "validation", error.to_string(), 2);
    }

    let breakdown = premium_breakdown(&trip);
    let message = format!(
        "premium for {destination}:\n  \
         - billed_days: {billed_days}\n  \
         - base_rate_per_day: {base_rate} DZD\n  \
         - destination_coefficient: {dest_coef}\n  \
         - age_coefficient: {age_coef}\n  \
         - raw_premium: {raw} DZD\n  \
         - premium: {premium} DZD",
        destination = trip.destination,
        billed_days = breakdown.billed_days,
        base_rate = breakdown.base_rate_per_day,
        dest_coef = breakdown.destination_coefficient,
        age_coef = breakdown.age_coefficient,
        raw = breakdown.raw_premium,
        premium = breakdown.premium,
    );
    CommandResult::success("premium", message)
}

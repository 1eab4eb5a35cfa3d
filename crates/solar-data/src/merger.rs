//! Left join of a sheet's daily records with its monthly aggregates.

use std::collections::HashMap;

use solar_core::models::{DailyRecord, MergedRecord, MonthlyFields, MonthlyRecord};

/// Join `daily` with `monthly` on `mes == mes_num` and tag every row with
/// `cad`.
///
/// Every daily record survives. A record whose month has no monthly row
/// gets absent monthly fields; one whose month matches several monthly rows
/// is repeated once per match, in monthly order. Monthly rows without a
/// month number never match.
pub fn merge_sheet(
    daily: &[DailyRecord],
    monthly: &[MonthlyRecord],
    cad: &str,
) -> Vec<MergedRecord> {
    let mut by_month: HashMap<u32, Vec<&MonthlyRecord>> = HashMap::new();
    for record in monthly {
        if let Some(num) = record.mes_num {
            by_month.entry(num).or_default().push(record);
        }
    }

    let mut merged = Vec::with_capacity(daily.len());
    for day in daily {
        match by_month.get(&day.mes) {
            Some(matches) => {
                for month in matches {
                    merged.push(MergedRecord {
                        daily: day.clone(),
                        monthly: MonthlyFields::from(*month),
                        cad: cad.to_string(),
                    });
                }
            }
            None => merged.push(MergedRecord {
                daily: day.clone(),
                monthly: MonthlyFields::default(),
                cad: cad.to_string(),
            }),
        }
    }
    merged
}

/*!

This is the long-form manual for `survey_scores` and `surveydash`.

## Indices

All the indices are percentages rounded to one decimal (half to even).
Every index only looks at its own column: a respondent that skipped the
satisfaction question still counts for the promoter score.

### CSI (Customer Satisfaction Index)

Rating from 1 to 5. The index is the share of the ratings equal to 4 or 5.

### CES (Customer Effort Score)

Rating from 1 to 5, same formula as CSI.

### CLI (Customer Loyalty Index)

Rating from 1 to 10. The average rating is mapped linearly so that 1 gives
0% and 10 gives 100%: `(mean - 1) / 9 * 100`.

### NPS (Net Promoter Score)

Rating from 0 to 10, split into three bands:
* Detractor: 0 to 6
* Passive: 7 and 8
* Promoter: 9 and 10

The score is `Promoter% - Detractor%`. The difference is taken before the
rounding, so it may differ by 0.1 from the difference of the rounded bands.

## Missing and invalid values

Cells are coerced to numbers before any computation. Text that does not
parse as a number becomes missing, and missing values are left out of the
denominators. An index with no usable value is reported as absent (`null` in
the JSON report), never as zero.

## Input formats

### `xlsx`

The responses of an event are stored in one workbook with one sheet per
venue. The sheet is chosen with the name of the venue (`--unit`).

The archive workbook has two sheets:
* `Sheet1`: `Tahun`, `Event`, `Unit`, `CSI`, `CLI`, `NPS`
* `Sheet2`: `Tahun`, `Event`, `Unit`, `Detractor`, `Passive`, `Promoter`, `NPS`

The archive rows must be stored in chronological order. Trend windows are
taken from the stored order, without sorting.

### `csv`

A single venue per file, with a header row. An archive in CSV format is
split in two files (`--archive` and `--archive-breakdown`).

## Trends

The trend of a selection is made of the archive row of the selection and of
up to 4 rows stored before it (`--lookback`). The comparison with the
previous year only uses the row of the exact previous year for the same
event and venue. When there is none, the deltas are absent.

*/

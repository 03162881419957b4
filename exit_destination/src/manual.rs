/*!

This is the long-form manual for `exit_destination` and `exitreport`.

## Input data

The report is computed from two exports of the HMIS (Homeless Management Information System):

* the **entry data**: one row per person and enrollment, with the date of birth, the
  demographics, the housing move-in date and the relationship to the head of household
* the **exit data**: one row per person and enrollment that exited, with the exit date and
  the destination

### `xlsx`

Workbooks (Excel .xlsx) with one sheet `Entry data` and one sheet `Exit data`. Only the first
10 columns of each sheet are read (this can be changed with `maxColumns`). Several workbooks can
be given, their rows are concatenated. CSV files are read with all their columns.

Dates stored as Excel dates are converted to the `MM/DD/YYYY` text of the exports.

### `csv`

One CSV file for the entry data and one for the exit data. The first line holds the column
names. Empty cells are missing values.

## Column names

The default column names are the ones of the exports:

| Field                      | Default column                      | Side  |
|----------------------------|-------------------------------------|-------|
| unique id                  | `Unique ID`                         | both  |
| household id               | `Household ID`                      | both  |
| enrollment start date      | `Enrollment Start Date`             | entry |
| enrollment exit date       | `Enrollment Exit Date`              | exit  |
| date of birth              | `DOB`                               | entry |
| housing move-in date       | `Housing Move-In Date`              | entry |
| gender, race, ethnicity    | `Gender`, `Race`, `Ethnicity`       | entry |
| relationship               | `Relationship to Head of Household` | entry |
| destination                | `Destination`                       | exit  |
| other destination          | `Specify Other Exit Destination`    | exit  |

They can be overridden with the `columns` section of the configuration file.

## Processing

1. The column names are trimmed and the duplicate rows removed from each side.
2. The exit rows are joined to the entry rows on all the columns both sides have in common.
   This fails if there is no such column.
3. The housing move-in date of a household is copied to every member of the household. If the
   rows of a household carry different dates, the first one is used and the household is
   listed in the data quality section.
4. Enrollments without an exit date are dropped: these people have not exited yet.
5. The age at exit is computed for each person. A household is:
   * **without children** if all its members are known to be adults (18 or older)
   * **with children and adults** if it has at least one adult and one child
   * **with only children** if all its members are known to be children
   * **unknown** otherwise
6. Each destination is matched exactly against the list of destinations of the reporting
   standard, which puts it in one of the *permanent*, *temporary*, *institutional* or *other*
   destinations. People who never moved in get no destination type.

## The report

Only the heads of household (`Self (head of household)`) that moved in are counted, and each
household is counted once. For each destination type, the report has a header row, one row
per destination and a `Subtotal` row. Then come:

* `Total`: the sum of the subtotals
* `Total persons exiting to positive housing destinations`: the permanent destinations
* `Total persons whose destinations excluded them from the calculation`: all the others
* `Percentage`: the total divided by the number of heads of household that moved in and have a
  known destination type. When there is none, all the cells are `N/A`.

## Data quality

Problems in the data do not stop the report. They are counted in the `dataQuality` section of
the output:

* duplicate rows removed from each side
* rows without exit date or without household id
* records with an unknown age or without move-in date
* destinations that are not in the list (`taxonomyMismatches`, `unmatchedDestinations`)
* households with conflicting move-in dates

## Configuration file

```json
{
  "outputSettings": {
    "reportName": "APR 2023",
    "continuumName": "Example CoC",
    "outputDirectory": "out"
  },
  "inputSources": [
    { "provider": "xlsx", "filePath": "exports/q1.xlsx" },
    { "provider": "csv", "entryPath": "entry.csv", "exitPath": "exit.csv" }
  ],
  "columns": { "dateOfBirth": "Date of Birth" },
  "maxColumns": 10,
  "flowAttributes": ["Race", "Destination Type", "Destination"]
}
```

All the paths are relative to the directory of the configuration file.

*/

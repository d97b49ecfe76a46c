/*!

This is the long-form manual for `survey_stats` and `surveytab`.

## Input formats

The following formats are supported:
* `csv` Comma Separated Values, as exported by the survey tool
* `xlsx` Excel workbook, as downloaded from Microsoft Forms or Google Forms

### `csv`

The first line is a header. Every other line is one respondent:

```text
compras,compra_en,asociacion,descripcion,comunicacion,...,ciudad
"Sí","Sí","Muy asociada","Confiable","Clara",...,"Quito - Norte"
```

Fields may be wrapped in double quotes, and commas inside quotes belong to the field.
Doubled quotes (`""`) inside a quoted field are not supported: each quote simply opens
or closes the quoted section.

Blank lines are ignored. Lines with fewer than 5 fields are considered truncated and are
skipped without error.

### `xlsx`

When the workbook has a single worksheet, it is used. Otherwise the name of the worksheet
must be provided. The first row is the
header, and every cell is read as text.

## Column mapping

By default, the columns are read by position:

| column | field                              |
|--------|------------------------------------|
| 0      | `compras_dermocosmetica`           |
| 1      | `compra_en_fybeca`                 |
| 2      | `asociacion_fybeca`                |
| 3      | `descripcion_fybeca`               |
| 4      | `comunicacion_calidad`             |
| 5      | `aborda_problemas_reales`          |
| 12     | `percepcion_precios`               |
| 13-17  | `influencia_*` (agreement scale)   |
| 18     | `confianza_experta`                |
| 19     | `asesoria_adecuada`                |
| 26     | `mejora_para_elegir`               |
| last   | `ciudad`                           |

When the columns of the export move, the positional mapping silently reads the wrong
answers. Use the header mapping instead (`"columnMapping": "header"` or `--mapping header`).
By default the header must contain the field keys above. Otherwise `dataSource.columns`
maps each field key to the name of its column in the header, and the fields that are not
listed are left empty. A listed column that is missing from the header is an error.

## Cities

The city is recognized when it contains `quito` or `uio` (Quito) or `guayaquil` or `gye`
(Guayaquil), in any case. Other values are kept as written. These respondents do not
appear in the city dashboards, but they are counted in the overall tables.

## Missing answers

Empty answers and the `nan` and `null` placeholders are not counted: the percentages of a
question are computed over the respondents who answered it.

## Configuration

```json
{
  "outputSettings": { "surveyName": "Encuesta Dermocosmética", "outputPath": "summary.json" },
  "dataSource": { "provider": "csv", "filePath": "encuesta.csv" },
  "groups": ["Quito", "Guayaquil"]
}
```

The questions of the city dashboards and of the comparison can be replaced with
`cityQuestions` and `comparisonQuestions`, lists of `{"field", "label", "question"}`
where `field` is one of the field keys.

The paths are relative to the directory of the configuration file. The command line
options `--input`, `--input-type`, `--excel-worksheet-name`, `--mapping` and `--out`
override the values of the file. Paths given on the command line are relative to the
working directory.

The two `groups` must be different cities.

 */
